mod tests {
    use embassy_time::{Duration, Instant};
    use pixelweave::beat::{BEAT_WINDOW_SAMPLES, BeatConfig, BeatDetector, BeatPhase};

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn detector() -> BeatDetector {
        BeatDetector::new(BeatConfig::new(1.0, Duration::from_millis(500)), at(0))
    }

    #[test]
    fn test_single_beat_after_quiet_run() {
        let mut detector = detector();
        let mut beats = 0;
        for i in 0..10 {
            if detector.process(at(600 + i * 10), 0.2).is_some() {
                beats += 1;
            }
        }
        let beat = detector.process(at(700), 2.5);
        assert!(beat.is_some());
        beats += usize::from(beat.is_some());

        assert_eq!(beats, 1);
        assert_eq!(detector.last_beat(), at(700));
        assert_eq!(detector.sample_count(), 0);
        assert!((beat.unwrap().span - 2.3).abs() < 1e-4);
    }

    #[test]
    fn test_swing_inside_suppression_window() {
        let mut detector = detector();

        detector.process(at(990), 0.2);
        let first = detector.process(at(1000), 2.5);
        assert!(first.is_some());

        // Second swing arrives after half of min_elapsed
        detector.process(at(1240), 0.2);
        assert_eq!(detector.phase(at(1250)), BeatPhase::Idle);
        assert!(detector.process(at(1250), 2.5).is_none());
        assert_eq!(detector.sample_count(), 0);
        assert_eq!(detector.last_beat(), at(1000));

        detector.process(at(1590), 0.2);
        assert_eq!(detector.phase(at(1600)), BeatPhase::Armed);
        assert!(detector.process(at(1600), 2.5).is_some());
        assert_eq!(detector.last_beat(), at(1600));
    }

    #[test]
    fn test_no_beat_for_small_swings() {
        let mut detector = detector();
        for i in 0..200 {
            let level = if i % 2 == 0 { 0.5 } else { 1.4 };
            assert!(detector.process(at(1000 + i * 10), level).is_none());
        }
        assert_eq!(detector.sample_count(), BEAT_WINDOW_SAMPLES);
    }

    #[test]
    fn test_window_forgets_old_samples() {
        let mut detector = detector();
        detector.process(at(1000), 0.0);
        for i in 0..BEAT_WINDOW_SAMPLES as u64 {
            detector.process(at(1001 + i), 0.9);
        }
        // The 0.0 sample has scrolled out of the window
        assert!(detector.process(at(1100), 1.8).is_none());
    }

    #[test]
    fn test_major_beats() {
        let config = BeatConfig::new(1.0, Duration::from_millis(200))
            .with_major_elapsed(Duration::from_millis(1000));
        let mut detector = BeatDetector::new(config, at(0));

        detector.process(at(1500), 0.0);
        let beat = detector.process(at(1500), 2.0).unwrap();
        assert!(beat.major);
        assert!((beat.elapsed - 1.5).abs() < 1e-3);

        detector.process(at(1800), 0.0);
        let beat = detector.process(at(1800), 2.0).unwrap();
        assert!(!beat.major);
        assert!((detector.seconds_since_last_beat(at(2300)) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_reset() {
        let mut detector = detector();
        detector.process(at(100), 0.3);
        detector.reset(at(5000));
        assert_eq!(detector.sample_count(), 0);
        assert_eq!(detector.last_beat(), at(5000));
        assert_eq!(detector.phase(at(5100)), BeatPhase::Idle);
    }
}
