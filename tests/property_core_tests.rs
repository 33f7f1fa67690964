use std::f64::consts::TAU;

use proptest::prelude::*;
use serde_json::{Map, Value};
use vote_charts::api::{AnimationScheduler, Chart, ChartOptions, ManualClock};
use vote_charts::charts::{RingCache, RingChartConfig, RingRecord};
use vote_charts::core::palette::palette_index;
use vote_charts::core::{
    ColorAssignment, DEFAULT_COLOR_SCHEME, DataSet, Easing, Entry, SortMode, Viewport,
};
use vote_charts::render::RecordingSurface;

fn vote_object(votes: &[u64]) -> Value {
    let mut object = Map::new();
    for (index, count) in votes.iter().enumerate() {
        object.insert(format!("option {index}"), Value::from(*count));
    }
    Value::Object(object)
}

proptest! {
    #[test]
    fn palette_indices_stay_in_bounds_and_never_decrease(
        entries in 1_usize..64,
        palette_len in 1_usize..32
    ) {
        let mut previous = 0;
        for index in 0..entries {
            let picked = palette_index(index, entries, palette_len);
            prop_assert!(picked < palette_len);
            prop_assert!(picked >= previous);
            previous = picked;
        }
    }

    #[test]
    fn color_assignment_has_one_color_per_entry(votes in prop::collection::vec(0_u64..1_000, 0..20)) {
        let data = DataSet::from_entries(
            votes.iter().enumerate().map(|(index, count)| Entry::new(format!("{index}"), *count)),
            SortMode::None,
        );
        let colors = ColorAssignment::from_palette(&data, &DEFAULT_COLOR_SCHEME);
        prop_assert_eq!(colors.len(), data.len());
        for color in colors.colors() {
            prop_assert!(DEFAULT_COLOR_SCHEME.contains(color));
        }
    }

    #[test]
    fn sorted_data_keeps_every_entry(votes in prop::collection::vec(0_u64..10_000, 0..30)) {
        let data = DataSet::from_json(&vote_object(&votes), SortMode::Desc);
        prop_assert_eq!(data.len(), votes.len());
        prop_assert_eq!(data.total_votes(), votes.iter().sum::<u64>());
        for pair in data.entries().windows(2) {
            prop_assert!(pair[0].votes >= pair[1].votes);
        }
    }

    #[test]
    fn easing_never_overshoots_and_settles(
        start in -500.0_f64..500.0,
        target in -500.0_f64..500.0,
        linear_rate in 1.0_f64..50.0,
        ease in 1.0_f64..20.0,
        time_delta in 0.5_f64..4.0
    ) {
        let easing = Easing::hybrid(linear_rate, ease, 0.001);
        let mut value = start;
        let mut settled = false;
        for _ in 0..20_000 {
            let eased = easing.step(value, target, time_delta);
            prop_assert!((target - eased.value).abs() <= (target - value).abs());
            prop_assert!((eased.value - value) * (target - value) >= 0.0);
            value = eased.value;
            if eased.settled {
                settled = true;
                break;
            }
        }
        prop_assert!(settled);
        prop_assert_eq!(value, target);
    }

    #[test]
    fn frame_deltas_are_never_negative(steps in prop::collection::vec(-50.0_f64..100.0, 1..40)) {
        let clock = ManualClock::new();
        let mut scheduler = AnimationScheduler::new(clock.clone());
        prop_assert!(scheduler.start(0.0));
        let mut now = 0.0;
        for step in steps {
            now += step;
            clock.set_ms(now);
            if let Some(time_delta) = scheduler.begin_frame() {
                prop_assert!(time_delta >= 0.0);
                scheduler.end_frame(false);
            }
        }
    }

    #[test]
    fn ring_arcs_cover_full_turn_and_skip_zero_votes(
        votes in prop::collection::vec(0_u64..5_000, 1..12)
    ) {
        let data = vote_object(&votes);
        let mut chart = Chart::ring_chart(
            RecordingSurface::new(Viewport::new(1, 1)),
            &data,
            ChartOptions::default(),
            RingChartConfig::default(),
        )
        .expect("ring chart");
        chart.start_chart(0.0).expect("start");

        let total = chart.data().total_votes();
        let slots = chart.caches().slots(RingCache::Arc).expect("arcs");
        let mut covered = 0.0;
        for (index, slot) in slots.iter().enumerate() {
            let votes = chart.data().entries()[index].votes;
            let zero_absent = if total == 0 { index != 0 } else { votes == 0 };
            prop_assert_eq!(slot.is_present(), !zero_absent);
            prop_assert_eq!(chart.caches().registry().contains(RingCache::Arc, index), !zero_absent);
            if votes == 0 {
                prop_assert!(!chart.caches().registry().contains(RingCache::VoteList, index));
            }
            if let Some(RingRecord::Arc { rad_percent, .. }) = slot.record().map(|record| &record.data) {
                covered += rad_percent;
            }
        }
        prop_assert!((covered - TAU).abs() <= 1e-9);
    }
}

