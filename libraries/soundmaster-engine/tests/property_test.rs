//! Property-based tests for the volume engine
//!
//! Uses proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use soundmaster_engine::simulated::{
    simulated_agent, SimulatedAgent, SimulatedAudio, SimulatedDocument, SimulatedElement,
};
use soundmaster_engine::{clamped_native_volume, ElementTable, GainStage, MediaElement};

const TOLERANCE: f64 = 1e-6;

fn audio_capability() -> impl Strategy<Value = bool> {
    any::<bool>()
}

proptest! {
    /// Property: with a gain stage, perceived loudness equals original * percent / 100
    #[test]
    fn gain_path_reaches_exact_loudness(
        original in 0.0f64..=1.0,
        percent in 0u32..=300,
    ) {
        let video = SimulatedElement::video("a.mp4", original);
        let document = SimulatedDocument::with_elements(vec![video.clone()]);
        let mut agent = simulated_agent(document, SimulatedAudio::new());

        agent.apply_to_all(percent);

        let expected = original * f64::from(percent) / 100.0;
        prop_assert!((agent.engine().perceived_loudness(&video) - expected).abs() < TOLERANCE);
    }

    /// Property: without a gain stage, loudness matches whenever the element can reach it
    #[test]
    fn native_path_reaches_loudness_within_range(
        original in 0.0f64..=1.0,
        percent in 0u32..=300,
    ) {
        let video = SimulatedElement::video("a.mp4", original);
        let document = SimulatedDocument::with_elements(vec![video.clone()]);
        let mut agent = simulated_agent(document, SimulatedAudio::unavailable());

        agent.apply_to_all(percent);

        let expected = original * f64::from(percent) / 100.0;
        let loudness = agent.engine().perceived_loudness(&video);
        if expected <= 1.0 {
            prop_assert!((loudness - expected).abs() < TOLERANCE);
        } else {
            prop_assert!((loudness - 1.0).abs() < TOLERANCE);
        }
    }

    /// Property: native volume always stays inside the element's valid range
    #[test]
    fn native_volume_always_valid(
        original in 0.0f64..=1.0,
        percents in prop::collection::vec(0u32..=400, 1..20),
        available in audio_capability(),
        bound_elsewhere in any::<bool>(),
    ) {
        let video = SimulatedElement::video("a.mp4", original);
        if bound_elsewhere {
            video.bind_elsewhere();
        }
        let document = SimulatedDocument::with_elements(vec![video.clone()]);
        let audio = if available { SimulatedAudio::new() } else { SimulatedAudio::unavailable() };
        let mut agent = simulated_agent(document, audio);

        for percent in percents {
            agent.apply_to_all(percent);
            prop_assert!((0.0..=1.0).contains(&video.volume()));
        }
    }

    /// Property: applying the same percent twice equals applying it once
    #[test]
    fn apply_to_all_is_idempotent(
        volumes in prop::collection::vec(0.0f64..=1.0, 1..6),
        history in prop::collection::vec(0u32..=300, 0..5),
        percent in 0u32..=300,
        available in audio_capability(),
    ) {
        let elements: Vec<SimulatedElement> = volumes
            .iter()
            .map(|volume| SimulatedElement::video("a.mp4", *volume))
            .collect();
        let document = SimulatedDocument::with_elements(elements.clone());
        let audio = if available { SimulatedAudio::new() } else { SimulatedAudio::unavailable() };
        let mut agent = simulated_agent(document, audio);

        for earlier in history {
            agent.apply_to_all(earlier);
        }

        let state = |agent: &SimulatedAgent| -> Vec<(f64, Option<f32>)> {
            elements
                .iter()
                .map(|element| {
                    (
                        element.volume(),
                        agent.engine().table().gain_node(element).map(|node| node.gain()),
                    )
                })
                .collect()
        };

        agent.apply_to_all(percent);
        let once = state(&agent);
        agent.apply_to_all(percent);
        let twice = state(&agent);

        prop_assert_eq!(once, twice);
    }

    /// Property: the original volume is captured once and never overwritten
    #[test]
    fn original_volume_never_changes(
        original in 0.0f64..=1.0,
        percents in prop::collection::vec(0u32..=300, 1..10),
    ) {
        let video = SimulatedElement::video("a.mp4", original);
        let document = SimulatedDocument::with_elements(vec![video.clone()]);
        let mut agent = simulated_agent(document, SimulatedAudio::unavailable());

        for percent in percents {
            agent.apply_to_all(percent);
            prop_assert_eq!(agent.engine().table().original_volume(&video), Some(original));
        }
    }

    /// Property: the fallback result matches the clamping formula exactly
    #[test]
    fn fallback_matches_clamping_formula(
        original in 0.0f64..=1.0,
        percent in 0u32..=300,
    ) {
        prop_assume!(percent != 100);
        let video = SimulatedElement::video("a.mp4", original);
        video.bind_elsewhere();
        let document = SimulatedDocument::with_elements(vec![video.clone()]);
        let mut agent = simulated_agent(document, SimulatedAudio::new());

        agent.apply_to_all(percent);

        prop_assert_eq!(video.volume(), clamped_native_volume(original, percent));
        let snapshot = agent.engine().debug_snapshot(&[video.clone()]);
        prop_assert!(!snapshot.elements[0].has_gain_node);
    }
}
