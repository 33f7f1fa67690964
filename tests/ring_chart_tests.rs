use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use approx::assert_relative_eq;
use serde_json::{Value, json};
use vote_charts::api::{Chart, ChartOptions, FrameRequest, ManualClock, SchedulerState};
use vote_charts::charts::{RingCache, RingChart, RingChartConfig, RingRecord};
use vote_charts::core::{Point, Viewport};
use vote_charts::render::{Color, DrawCommand, RecordingSurface};

const FRAME_MS: f64 = 1000.0 / 60.0;
const MAX_FRAMES: usize = 2_000;

type RingTestChart = Chart<RecordingSurface, RingChart, ManualClock>;

fn ring_chart(clock: &ManualClock, data: &Value, config: RingChartConfig) -> RingTestChart {
    let mut chart = Chart::with_clock(
        RecordingSurface::new(Viewport::new(1, 1)),
        data,
        ChartOptions::default(),
        RingChart::new(config).expect("ring config"),
        clock.clone(),
    );
    chart.start_chart(0.0).expect("start");
    chart
}

fn election() -> Value {
    json!({"A": 742, "B": 604, "C": 123, "D": 293, "E": 60})
}

fn run_until_asleep(chart: &mut RingTestChart, clock: &ManualClock) {
    for _ in 0..MAX_FRAMES {
        if chart.on_frame().expect("frame") == FrameRequest::Sleep {
            return;
        }
        clock.advance_ms(FRAME_MS);
    }
    panic!("ring chart did not settle within {MAX_FRAMES} frames");
}

fn arc_spans(chart: &RingTestChart) -> Vec<(usize, f64, f64)> {
    chart
        .caches()
        .slots(RingCache::Arc)
        .expect("arc cache")
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| match slot.record().map(|record| &record.data) {
            Some(RingRecord::Arc {
                rad_offset,
                rad_percent,
                ..
            }) => Some((index, *rad_offset, *rad_percent)),
            _ => None,
        })
        .collect()
}

/// Runs frames until the chart sleeps, sampling `value` after each one.
fn trace_until_asleep(
    chart: &mut RingTestChart,
    clock: &ManualClock,
    value: impl Fn(&RingChart) -> f64,
) -> Vec<f64> {
    let mut samples = vec![value(chart.variant())];
    for _ in 0..MAX_FRAMES {
        clock.advance_ms(FRAME_MS);
        let request = chart.on_frame().expect("frame");
        samples.push(value(chart.variant()));
        if request == FrameRequest::Sleep {
            return samples;
        }
    }
    panic!("ring chart did not settle within {MAX_FRAMES} frames");
}

/// Every step moves toward `target` without passing it, and the last sample lands on it.
fn assert_eases_toward(samples: &[f64], target: f64) {
    for pair in samples.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        assert!(
            (target - next).abs() <= (target - previous).abs(),
            "{previous} -> {next} moved away from {target}"
        );
        assert!(
            (next - previous) * (target - previous) >= 0.0,
            "{previous} -> {next} passed {target}"
        );
    }
    assert_eq!(samples.last().copied(), Some(target));
}

/// Destination and alpha of the percent label of `index` on the visible surface.
fn percent_blit(chart: &RingTestChart, index: usize) -> Option<(Point, f64)> {
    let buffer_id = chart.caches().buffer(RingCache::PercentNum).expect("percent").id();
    let rect = chart
        .caches()
        .record(RingCache::PercentNum, index)
        .expect("percent cache")?
        .rect;
    chart.surface().commands().iter().find_map(|command| match command {
        DrawCommand::DrawSurface {
            source_id,
            source_rect,
            dest,
            alpha,
        } if *source_id == buffer_id && *source_rect == rect => Some((*dest, *alpha)),
        _ => None,
    })
}

/// Start angle and span of the arc of `index`.
fn arc_span(chart: &RingTestChart, index: usize) -> (f64, f64) {
    arc_spans(chart)
        .into_iter()
        .find(|(arc, _, _)| *arc == index)
        .map(|(_, offset, span)| (offset, span))
        .expect("arc present")
}

fn arc_middle(chart: &RingTestChart, index: usize) -> f64 {
    let (offset, span) = arc_span(chart, index);
    offset + span * 0.5
}

/// Point on the ring band at `angle` radians clockwise from 12 o'clock.
fn on_ring(chart: &RingTestChart, angle: f64) -> Point {
    let ring = chart.variant();
    let radius = (ring.inner_radius() + ring.outer_radius()) * 0.5;
    let center = ring.center();
    let offset = ring.center_offset();
    Point::new(
        center.x + offset.x + radius * angle.sin(),
        center.y + offset.y - radius * angle.cos(),
    )
}

#[test]
fn default_sort_is_descending_and_layout_fits_ring_and_list() {
    let clock = ManualClock::new();
    let chart = ring_chart(&clock, &election(), RingChartConfig::default());

    let titles: Vec<&str> = chart
        .data()
        .entries()
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(titles, ["A", "B", "D", "C", "E"]);
    // 160 + 25 offset + 2 * (20 + 16) label band, then list of 5 * 28 px
    assert_eq!(chart.viewport(), Viewport::new(258, 418));
    assert_relative_eq!(chart.variant().center().x, 129.0);
    assert_relative_eq!(chart.variant().center().y, 128.5);
}

#[test]
fn arcs_start_at_twelve_and_cover_full_turn() {
    let clock = ManualClock::new();
    let chart = ring_chart(&clock, &election(), RingChartConfig::default());

    let spans = arc_spans(&chart);
    assert_eq!(spans.len(), 5);
    assert_eq!(spans[0].1, 0.0);
    for pair in spans.windows(2) {
        assert_relative_eq!(pair[1].1, pair[0].1 + pair[0].2, epsilon = 1e-12);
    }
    let total: f64 = spans.iter().map(|(_, _, span)| span).sum();
    assert_relative_eq!(total, TAU, epsilon = 1e-9);
}

#[test]
fn labels_show_rounded_and_two_decimal_shares() {
    let clock = ManualClock::new();
    let chart = ring_chart(&clock, &election(), RingChartConfig::default());

    let percents = chart.caches().buffer(RingCache::PercentNum).expect("percent");
    assert_eq!(percents.texts(), ["41%", "33%", "16%", "7%", "3%"]);

    let list = chart.caches().buffer(RingCache::VoteList).expect("list");
    let texts = list.texts();
    assert_eq!(texts[0], "A");
    assert_eq!(texts[1], "40.72%");
    assert_eq!(texts[3], "33.15%");

    let center = chart.caches().buffer(RingCache::CenterInfo).expect("center");
    assert!(center.texts().contains(&"742"));
    assert!(center.texts().contains(&"RÖSTER"));
}

#[test]
fn all_zero_votes_draw_one_neutral_ring() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &json!({"A": 0, "B": 0}), RingChartConfig::default());

    let slots = chart.caches().slots(RingCache::Arc).expect("arcs");
    assert!(slots[0].is_present());
    assert!(!slots[1].is_present());
    assert_eq!(arc_spans(&chart)[0].2, TAU);

    let registry = chart.caches().registry();
    assert!(registry.contains(RingCache::Arc, 0));
    assert!(!registry.contains(RingCache::Arc, 1));
    assert!(!registry.contains(RingCache::VoteList, 0));
    assert!(!registry.contains(RingCache::VoteList, 1));

    let arcs = chart.caches().buffer(RingCache::Arc).expect("arc buffer");
    assert!(arcs.commands().iter().all(|command| matches!(
        command,
        DrawCommand::FillRingSector { color, .. } if *color == Color::NEUTRAL
    )));
    let percents = chart.caches().buffer(RingCache::PercentNum).expect("percent");
    assert_eq!(percents.texts(), ["0%"]);

    run_until_asleep(&mut chart, &clock);
    assert_eq!(chart.variant().circle_completion(), 1.0);
    assert_eq!(chart.variant().list_alpha(0), 0.5);
}

#[test]
fn zero_vote_entry_is_listed_but_never_selectable() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &json!({"A": 5, "B": 0}), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    assert!(!chart.caches().registry().contains(RingCache::Arc, 1));
    assert!(!chart.caches().registry().contains(RingCache::VoteList, 1));
    assert_eq!(
        chart.caches().buffer(RingCache::VoteList).expect("list").texts(),
        ["A", "100.00%", "B", "0%"]
    );

    // second list row
    let ring = chart.variant();
    let row_y = ring.config().diameter + 25.0 + 72.0 + 20.0 + 28.0 + 14.0;
    chart.pointer_move(chart.viewport().width as f64 * 0.5, row_y).expect("pointer");
    assert_eq!(chart.selection(), None);
}

#[test]
fn single_entry_is_a_full_circle_without_direction() {
    let clock = ManualClock::new();
    let chart = ring_chart(&clock, &json!({"Only": 12}), RingChartConfig::default());

    let record = chart
        .caches()
        .record(RingCache::Arc, 0)
        .expect("arc cache")
        .expect("present");
    match &record.data {
        RingRecord::Arc {
            rad_percent,
            direction,
            ..
        } => {
            assert_eq!(*rad_percent, TAU);
            assert_eq!(*direction, Point::ORIGIN);
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn opening_sweep_completes_before_sleep() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());

    chart.on_frame().expect("first frame");
    let early = chart.variant().circle_completion();
    assert!(early > 0.0 && early < 1.0);

    clock.advance_ms(FRAME_MS);
    run_until_asleep(&mut chart, &clock);
    assert_eq!(chart.variant().circle_completion(), 1.0);
    assert_eq!(chart.scheduler_state(), SchedulerState::Asleep);
    for index in 0..5 {
        assert_eq!(chart.variant().piece_offset(index), 0.0);
        assert_eq!(chart.variant().list_alpha(index), 1.0);
    }
}

#[test]
fn hovering_an_arc_offsets_it_and_dims_the_rest() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    let pointer = on_ring(&chart, FRAC_PI_4);
    chart.pointer_move(pointer.x, pointer.y).expect("hover A");
    assert_eq!(chart.selection(), Some(0));
    clock.advance_ms(FRAME_MS);
    run_until_asleep(&mut chart, &clock);

    let ring = chart.variant();
    assert_eq!(ring.piece_offset(0), 25.0);
    assert_eq!(ring.list_alpha(0), 1.0);
    for index in 1..5 {
        assert_eq!(ring.piece_offset(index), 0.0);
        assert_eq!(ring.list_alpha(index), 0.5);
    }
    assert_ne!(ring.center_offset(), Point::ORIGIN);

    chart.pointer_leave().expect("leave");
    assert_eq!(chart.selection(), None);
    clock.advance_ms(FRAME_MS);
    run_until_asleep(&mut chart, &clock);

    let ring = chart.variant();
    for index in 0..5 {
        assert_eq!(ring.piece_offset(index), 0.0);
        assert_eq!(ring.list_alpha(index), 1.0);
    }
    assert_eq!(ring.center_offset(), Point::ORIGIN);
}

#[test]
fn pointer_in_the_hole_selects_nothing() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    let center = chart.variant().center();
    chart.pointer_move(center.x + 5.0, center.y).expect("hole");
    assert_eq!(chart.selection(), None);
}

#[test]
fn hovering_a_list_row_selects_its_entry() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    // list starts at 257 + 20, rows are 28 px
    chart.pointer_move(100.0, 277.0 + 28.0 + 5.0).expect("row B");
    assert_eq!(chart.selection(), Some(1));
}

#[test]
fn solid_ring_has_no_center_info() {
    let clock = ManualClock::new();
    let chart = ring_chart(
        &clock,
        &election(),
        RingChartConfig::default().with_thickness(100.0),
    );
    assert!(!chart.caches().is_built(RingCache::CenterInfo));
    assert_eq!(chart.variant().inner_radius(), 0.0);
}

#[test]
fn disabled_percent_labels_shrink_layout() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(
        &clock,
        &election(),
        RingChartConfig::default().with_percent_nums_disabled(true),
    );
    assert!(!chart.caches().is_built(RingCache::PercentNum));
    // 160 + 25, list 200 wide fits inside
    assert_eq!(chart.viewport(), Viewport::new(200, 346));
    run_until_asleep(&mut chart, &clock);
}

#[test]
fn hover_offsets_and_dimming_follow_eased_paths() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    let pointer = on_ring(&chart, FRAC_PI_4);
    let mut offset = vec![chart.variant().piece_offset(0)];
    let mut dimmed = vec![chart.variant().list_alpha(1)];
    chart.pointer_move(pointer.x, pointer.y).expect("hover A");
    offset.push(chart.variant().piece_offset(0));
    dimmed.push(chart.variant().list_alpha(1));
    for _ in 0..MAX_FRAMES {
        clock.advance_ms(FRAME_MS);
        let request = chart.on_frame().expect("frame");
        offset.push(chart.variant().piece_offset(0));
        dimmed.push(chart.variant().list_alpha(1));
        if request == FrameRequest::Sleep {
            break;
        }
    }
    assert_eases_toward(&offset, 25.0);
    assert_eases_toward(&dimmed, 0.5);

    let mut retract = vec![chart.variant().piece_offset(0)];
    chart.pointer_leave().expect("leave");
    retract.extend(trace_until_asleep(&mut chart, &clock, |ring| ring.piece_offset(0)));
    assert_eases_toward(&retract, 0.0);
    assert_eq!(chart.variant().list_alpha(1), 1.0);
}

#[test]
fn narrow_arc_label_shows_only_while_offset() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(&clock, &election(), RingChartConfig::default());
    run_until_asleep(&mut chart, &clock);

    // 60 of 1822 votes leaves an arc shorter than the "3%" label
    assert_eq!(percent_blit(&chart, 4), None);
    assert_eq!(percent_blit(&chart, 0).map(|(_, alpha)| alpha), Some(1.0));

    let pointer = on_ring(&chart, arc_middle(&chart, 4));
    chart.pointer_move(pointer.x, pointer.y).expect("hover E");
    assert_eq!(chart.selection(), Some(4));
    let (_, partial) = percent_blit(&chart, 4).expect("fading in");
    assert!(partial > 0.0 && partial < 1.0);

    clock.advance_ms(FRAME_MS);
    run_until_asleep(&mut chart, &clock);
    assert_eq!(percent_blit(&chart, 4).map(|(_, alpha)| alpha), Some(1.0));
}

#[test]
fn labels_inside_the_band_are_white_and_hide_on_narrow_arcs() {
    let clock = ManualClock::new();
    let mut chart = ring_chart(
        &clock,
        &election(),
        RingChartConfig::default().with_percent_num_offset(-10.0),
    );
    let percents = chart.caches().buffer(RingCache::PercentNum).expect("percent");
    assert!(percents.commands().iter().all(|command| matches!(
        command,
        DrawCommand::FillText { style, .. } if style.color == Color::WHITE
    )));
    run_until_asleep(&mut chart, &clock);

    let ring = chart.variant();
    let (offset, span) = arc_span(&chart, 0);
    // 80 px outer radius, 10 px inside the band
    let bisector = offset + span * 0.5 - FRAC_PI_2;
    let rect = chart
        .caches()
        .record(RingCache::PercentNum, 0)
        .expect("percent cache")
        .expect("present")
        .rect;
    let (dest, alpha) = percent_blit(&chart, 0).expect("label of A");
    assert_eq!(alpha, 1.0);
    assert_relative_eq!(
        dest.x,
        ring.center().x + bisector.cos() * 70.0 - rect.w * 0.5,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        dest.y,
        ring.center().y + bisector.sin() * 70.0 - rect.h * 0.5,
        epsilon = 1e-9
    );

    let pointer = on_ring(&chart, arc_middle(&chart, 4));
    chart.pointer_move(pointer.x, pointer.y).expect("hover E");
    clock.advance_ms(FRAME_MS);
    run_until_asleep(&mut chart, &clock);
    assert_eq!(chart.variant().piece_offset(4), 25.0);
    assert_eq!(percent_blit(&chart, 4), None);
}

#[test]
fn outside_labels_use_their_arc_color() {
    let clock = ManualClock::new();
    let chart = ring_chart(&clock, &election(), RingChartConfig::default());
    let percents = chart.caches().buffer(RingCache::PercentNum).expect("percent");
    match &percents.commands()[0] {
        DrawCommand::FillText { style, .. } => assert_eq!(style.color, chart.colors().colors()[0]),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn overflowing_vote_total_keeps_arcs_on_one_turn() {
    let clock = ManualClock::new();
    let chart = ring_chart(
        &clock,
        &json!({"A": 1.8e19, "B": 1.8e19, "C": 7}),
        RingChartConfig::default(),
    );

    assert_eq!(chart.data().len(), 2);
    let total: f64 = arc_spans(&chart).iter().map(|(_, _, span)| span).sum();
    assert_relative_eq!(total, TAU, epsilon = 1e-9);
}
