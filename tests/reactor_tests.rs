use rxft8::audio::power::POWER_FLOOR_DB;
use rxft8::audio::wave::TARGET_DATA_BYTES;
use rxft8::decoder::job::JobId;
use rxft8::kernel::cycle::CAPTURE_THRESHOLD_BYTES;
use rxft8::kernel::effect::SideEffect;
use rxft8::kernel::event::{CleanupOutcome, DecoderExit, Event};
use rxft8::kernel::reactor::{Reactor, ReactorConfig};
use rxft8::kernel::time::EpochSecond;

const BASE_HZ: u64 = 14_074_000;
// 2018-07-01 12:34:45 UTC
const BOUNDARY: EpochSecond = EpochSecond(1_530_448_485);

fn reactor() -> Reactor {
    Reactor::new(ReactorConfig { base_frequency_hz: BASE_HZ }).unwrap()
}

/// Open a window and fill it in one datagram; returns the new job.
fn record_window(reactor: &mut Reactor, datagram: Vec<u8>) -> (JobId, Vec<SideEffect>) {
    assert!(reactor.step(Event::Tick(BOUNDARY)).is_empty());
    let effects = reactor.step(Event::Datagram(datagram));
    let job = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::StartDecode { job, .. } => Some(*job),
            _ => None,
        })
        .expect("window should be finalized");
    (job, effects)
}

#[tokio::test]
async fn test_filled_window_starts_decode_then_logs_power() {
    let mut reactor = reactor();
    let (job, effects) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);

    assert_eq!(effects.len(), 1);
    match &effects[0] {
        SideEffect::StartDecode {
            file_name,
            args,
            container,
            ..
        } => {
            assert_eq!(file_name, "180701_123445.wav");
            assert_eq!(args.join(" "), "--ft8 -d 3 -L 0 -H 3000 180701_123445.wav");
            assert_eq!(container.len(), 44 + TARGET_DATA_BYTES);
        }
        other => panic!("Expected StartDecode, got {:?}", other),
    }

    // Power is logged once the file is on disk
    let effects = reactor.step(Event::FileWritten(job));
    assert_eq!(effects.len(), 1);
    match &effects[0] {
        SideEffect::LogPower { stem, power_db } => {
            assert_eq!(stem, "180701_123445");
            assert_eq!(*power_db, POWER_FLOOR_DB);
        }
        other => panic!("Expected LogPower, got {:?}", other),
    }

    assert_eq!(reactor.windows_finalized(), 1);
    assert_eq!(reactor.in_flight(), 1);
    assert!(reactor.job(&job).is_some());
    assert!(!reactor.cycle.is_open());
}

#[tokio::test]
async fn test_full_scale_window_power() {
    let mut reactor = reactor();
    // Enough native audio that decimation fills the target with no padding
    let native: Vec<u8> = std::iter::repeat(i16::MAX.to_le_bytes())
        .take(TARGET_DATA_BYTES / 2 * 4)
        .flatten()
        .collect();
    let (job, _) = record_window(&mut reactor, native);
    let effects = reactor.step(Event::FileWritten(job));

    let expected = 10.0 * (f64::from(i16::MAX) * f64::from(i16::MAX)).log10();
    let power = effects
        .iter()
        .find_map(|e| match e {
            SideEffect::LogPower { power_db, .. } => Some(*power_db),
            _ => None,
        })
        .unwrap();
    assert!((power - expected).abs() < 1e-9, "{} vs {}", power, expected);
}

#[tokio::test]
async fn test_datagrams_after_finalize_are_dropped() {
    let mut reactor = reactor();
    record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);

    for _ in 0..10 {
        assert!(reactor.step(Event::Datagram(vec![0u8; CAPTURE_THRESHOLD_BYTES])).is_empty());
    }
    assert_eq!(reactor.windows_finalized(), 1);
}

#[tokio::test]
async fn test_decode_lifecycle() {
    let mut reactor = reactor();
    let (job, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);

    reactor.step(Event::FileWritten(job));
    reactor.step(Event::ProcessLaunched(job));

    // Verified CQ
    let effects = reactor.step(Event::DecoderOutput {
        job,
        chunk: "123456  -5  1234.5  1500 ~ CQ PY2ABC GG66".into(),
        received_at: EpochSecond(BOUNDARY.0 + 16),
    });
    assert_eq!(effects.len(), 2);
    match &effects[0] {
        SideEffect::LogDecode(line) => {
            assert_eq!(line, "180701 123456  -5  1234.5  1500 ~ CQ PY2ABC GG66*")
        }
        other => panic!("Expected LogDecode, got {:?}", other),
    }
    match &effects[1] {
        SideEffect::SubmitSpot(spot) => {
            assert_eq!(spot.callsign, "PY2ABC");
            assert_eq!(spot.frequency_hz, BASE_HZ + 1500);
            assert_eq!(spot.timestamp, BOUNDARY.0 + 16);
        }
        other => panic!("Expected SubmitSpot, got {:?}", other),
    }

    // Sign-off: logged, not reported
    let effects = reactor.step(Event::DecoderOutput {
        job,
        chunk: "123456  -5  0.3 1500 ~  PY2ABC K1ABC RR73".into(),
        received_at: BOUNDARY,
    });
    assert_eq!(effects.len(), 1);
    assert!(matches!(&effects[0], SideEffect::LogDecode(line) if !line.ends_with('*')));

    // Trailer: nothing at all
    let effects = reactor.step(Event::DecoderOutput {
        job,
        chunk: "<DecodeFinished>   0   2   0".into(),
        received_at: BOUNDARY,
    });
    assert!(effects.is_empty());
    assert_eq!(reactor.job(&job).unwrap().lines_seen(), 3);

    let effects = reactor.step(Event::DecoderExited {
        job,
        exit: DecoderExit::Code(0),
    });
    assert!(matches!(
        &effects[..],
        [SideEffect::CleanupWindow { file_name, .. }] if file_name == "180701_123445.wav"
    ));

    reactor.step(Event::Cleaned {
        job,
        outcome: CleanupOutcome::Deleted,
    });
    assert_eq!(reactor.in_flight(), 0);
}

#[tokio::test]
async fn test_abnormal_exit_still_cleans_up() {
    let mut reactor = reactor();
    let (job, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);
    reactor.step(Event::FileWritten(job));
    reactor.step(Event::ProcessLaunched(job));

    let effects = reactor.step(Event::DecoderExited {
        job,
        exit: DecoderExit::Abnormal,
    });
    assert_eq!(effects.len(), 1);

    reactor.step(Event::Cleaned {
        job,
        outcome: CleanupOutcome::Kept,
    });
    assert_eq!(reactor.in_flight(), 0);
}

#[tokio::test]
async fn test_abandoned_job_skips_exit_handling() {
    let mut reactor = reactor();
    let (job, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);
    reactor.step(Event::FileWritten(job));
    reactor.step(Event::JobAbandoned {
        job,
        reason: "decoder missing".into(),
    });
    assert_eq!(reactor.in_flight(), 0);

    let effects = reactor.step(Event::DecoderExited {
        job,
        exit: DecoderExit::Code(0),
    });
    assert!(effects.is_empty());
}

#[tokio::test]
async fn test_overlapping_decodes_are_independent() {
    let mut reactor = reactor();
    let (first, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);
    reactor.step(Event::FileWritten(first));
    reactor.step(Event::ProcessLaunched(first));

    // Next slot fires while the first decoder is still running
    reactor.step(Event::Tick(EpochSecond(BOUNDARY.0 + 15)));
    let effects = reactor.step(Event::Datagram(vec![0u8; CAPTURE_THRESHOLD_BYTES]));
    assert!(matches!(&effects[0], SideEffect::StartDecode { file_name, .. } if file_name == "180701_123500.wav"));
    assert_eq!(reactor.in_flight(), 2);

    // Output of the first job is logged under its own window date
    let effects = reactor.step(Event::DecoderOutput {
        job: first,
        chunk: "123445  -5  0.3 1500 ~  CQ PY2ABC GG66".into(),
        received_at: BOUNDARY,
    });
    assert!(matches!(&effects[0], SideEffect::LogDecode(line) if line.starts_with("180701 123445")));
}

#[tokio::test]
async fn test_unwritten_window_logs_no_power() {
    let mut reactor = reactor();
    let (job, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);

    let effects = reactor.step(Event::JobAbandoned {
        job,
        reason: "work dir missing".into(),
    });
    assert!(effects.is_empty());
    assert_eq!(reactor.in_flight(), 0);

    // A late write report for the dropped job changes nothing
    assert!(reactor.step(Event::FileWritten(job)).is_empty());
}

#[tokio::test]
async fn test_exit_before_launch_still_cleans_up_and_drops_job() {
    let mut reactor = reactor();
    let (job, _) = record_window(&mut reactor, vec![0u8; CAPTURE_THRESHOLD_BYTES]);
    reactor.step(Event::FileWritten(job));

    // ProcessLaunched never arrived, so ProcessExited is refused
    let effects = reactor.step(Event::DecoderExited {
        job,
        exit: DecoderExit::Code(0),
    });
    assert!(matches!(
        &effects[..],
        [SideEffect::CleanupWindow { file_name, .. }] if file_name == "180701_123445.wav"
    ));
    assert_eq!(reactor.in_flight(), 0);

    reactor.step(Event::Cleaned {
        job,
        outcome: CleanupOutcome::Deleted,
    });
    assert_eq!(reactor.in_flight(), 0);
}
