//! Pipeline tests: generic orchestration, error propagation, and end-to-end signing runs.

use anyhow::Result;
use signpipe::engine::{aggregate_stage, multi_hash_stage, single_hash_stage};
use signpipe::{
    Blake3Signer, FnSigner, Gate, Item, NamedStage, PipelineError, SignOpts, Signer,
    execute_pipeline, sign_items, sign_range, sign_with_report,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

fn reverse_upper() -> Arc<dyn Signer> {
    Arc::new(FnSigner::new(reverse, |s: &str| s.to_uppercase()))
}

// --- execute_pipeline (generic) ---

#[test]
fn test_execute_pipeline_no_stages_returns_source() -> Result<()> {
    let out = execute_pipeline(vec![1, 2, 3], Vec::<NamedStage<i32>>::new())?;
    assert_eq!(out, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_execute_pipeline_chains_stages_in_order() -> Result<()> {
    let double = NamedStage::new("double", |rx: crossbeam_channel::Receiver<i64>, tx| {
        for v in rx {
            tx.send(v * 2)?;
        }
        Ok(())
    });
    let add_one = NamedStage::new("add-one", |rx: crossbeam_channel::Receiver<i64>, tx| {
        for v in rx {
            tx.send(v + 1)?;
        }
        Ok(())
    });
    let sum = NamedStage::new("sum", |rx: crossbeam_channel::Receiver<i64>, tx| {
        tx.send(rx.iter().sum())?;
        Ok(())
    });
    let out = execute_pipeline(1..=4, vec![double, add_one, sum])?;
    // (2+1) + (4+1) + (6+1) + (8+1)
    assert_eq!(out, vec![24]);
    Ok(())
}

#[test]
fn test_execute_pipeline_stage_sees_all_items_then_close() -> Result<()> {
    let count = NamedStage::new("count", |rx: crossbeam_channel::Receiver<usize>, tx| {
        let n = rx.iter().count();
        tx.send(n)?;
        Ok(())
    });
    let out = execute_pipeline(0..1000, vec![count])?;
    assert_eq!(out, vec![1000]);
    Ok(())
}

#[test]
fn test_execute_pipeline_reports_failing_stage() {
    let pass = NamedStage::new("pass", |rx: crossbeam_channel::Receiver<u8>, tx| {
        for v in rx {
            let _ = tx.send(v);
        }
        Ok(())
    });
    let fail = NamedStage::new("fail", |rx: crossbeam_channel::Receiver<u8>, _tx| {
        let _ = rx.recv();
        anyhow::bail!("boom")
    });
    let err = execute_pipeline(0..10u8, vec![pass, fail]).unwrap_err();
    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::StageFailed { index, name }) => {
            assert_eq!(*index, 1);
            assert_eq!(name, "fail");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(format!("{err:#}").contains("boom"));
}

#[test]
fn test_execute_pipeline_reports_panicking_stage() {
    let panics = NamedStage::new("panics", |_rx: crossbeam_channel::Receiver<u8>, _tx| {
        panic!("stage blew up")
    });
    let err = execute_pipeline(0..3u8, vec![panics]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::StagePanicked { index: 0, .. })
    ));
}

// --- stage shape checks ---

#[test]
fn test_single_hash_rejects_text_item() {
    let stage = single_hash_stage(reverse_upper(), Arc::new(Gate::new(1)));
    let err = execute_pipeline(vec![Item::Text("x".into())], vec![stage]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::StageFailed { index: 0, .. })
    ));
    let root = err.root_cause().to_string();
    assert!(root.contains("expected index"), "{root}");
}

#[test]
fn test_multi_hash_rejects_index_item() {
    let stage = multi_hash_stage(reverse_upper(), Arc::new(Gate::new(1)));
    let err = execute_pipeline(vec![Item::Index(3)], vec![stage]).unwrap_err();
    assert!(err.root_cause().to_string().contains("expected text"));
}

#[test]
fn test_aggregate_rejects_index_item() {
    let err = execute_pipeline(vec![Item::Index(3)], vec![aggregate_stage(None)]).unwrap_err();
    assert!(err.root_cause().to_string().contains("aggregate"));
}

// --- Stage A ---

#[test]
fn test_single_hash_outputs_fast_then_slow_derived() -> Result<()> {
    let stage = single_hash_stage(reverse_upper(), Arc::new(Gate::new(1)));
    let source = vec![Item::Index(12), Item::Index(30)];
    let mut out: Vec<Item> = execute_pipeline(source, vec![stage])?;
    out.sort_by_key(|i| format!("{i:?}"));
    // fast("12") = "21"; fast(slow("12")) = reverse("12") = "21"
    assert_eq!(
        out,
        vec![Item::Text("03~03".into()), Item::Text("21~21".into())]
    );
    Ok(())
}

#[test]
fn test_single_hash_combines_by_role_not_arrival() -> Result<()> {
    // Fast hash on the raw item is slow to finish; the slow-derived value arrives first.
    let signer: Arc<dyn Signer> = Arc::new(FnSigner::new(
        |s: &str| {
            if !s.starts_with('S') {
                thread::sleep(Duration::from_millis(40));
            }
            format!("F{s}")
        },
        |s: &str| format!("S{s}"),
    ));
    let stage = single_hash_stage(signer, Arc::new(Gate::new(1)));
    let out = execute_pipeline(vec![Item::Index(5)], vec![stage])?;
    assert_eq!(out, vec![Item::Text("F5~FS5".into())]);
    Ok(())
}

// --- end to end ---

fn expected_reverse_upper(items: &[u64]) -> String {
    let mut parts: Vec<String> = items
        .iter()
        .map(|n| {
            let s = n.to_string();
            let stage_a = format!("{}~{}", reverse(&s), reverse(&s.to_uppercase()));
            (0..6)
                .map(|i| reverse(&format!("{i}{stage_a}")))
                .collect::<String>()
        })
        .collect();
    parts.sort();
    parts.join("_")
}

#[test]
fn test_end_to_end_reverse_upper() -> Result<()> {
    let out = sign_items(vec![0, 1, 2], &SignOpts::default(), reverse_upper())?;
    assert_eq!(out, expected_reverse_upper(&[0, 1, 2]));
    assert_eq!(out.matches('_').count(), 2);
    for segment in out.split('_') {
        // Each of the six fan-out hashes carries the Stage A "~" once.
        assert_eq!(segment.matches('~').count(), 6);
    }
    Ok(())
}

#[test]
fn test_one_segment_per_item() -> Result<()> {
    let out = sign_range(0..=19, &SignOpts::default(), Arc::new(Blake3Signer::new()))?;
    let segments: Vec<&str> = out.split('_').collect();
    assert_eq!(segments.len(), 20);
    let unique: HashSet<&str> = segments.iter().copied().collect();
    assert_eq!(unique.len(), 20);
    let mut sorted = segments.clone();
    sorted.sort_unstable();
    assert_eq!(segments, sorted);
    Ok(())
}

#[test]
fn test_idempotent_runs() -> Result<()> {
    let signer: Arc<dyn Signer> = Arc::new(Blake3Signer::new());
    let opts = SignOpts {
        fanout_items: 3,
        ..SignOpts::default()
    };
    let first = sign_range(0..=9, &opts, Arc::clone(&signer))?;
    let second = sign_range(0..=9, &opts, signer)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_input_order_does_not_matter() -> Result<()> {
    let signer: Arc<dyn Signer> = Arc::new(Blake3Signer::new());
    let forward = sign_items(vec![0, 1, 2, 3, 4], &SignOpts::default(), Arc::clone(&signer))?;
    let shuffled = sign_items(vec![3, 0, 4, 2, 1], &SignOpts::default(), signer)?;
    assert_eq!(forward, shuffled);
    Ok(())
}

#[test]
fn test_empty_input_yields_empty_string() -> Result<()> {
    let out = sign_items(Vec::new(), &SignOpts::default(), reverse_upper())?;
    assert_eq!(out, "");
    Ok(())
}

// --- concurrency properties ---

/// Signer whose slow hash records how many calls overlap.
struct CountingSigner {
    current: AtomicUsize,
    max_seen: AtomicUsize,
    calls: AtomicUsize,
}

impl Signer for CountingSigner {
    fn fast(&self, data: &str) -> String {
        reverse(data)
    }

    fn slow(&self, data: &str) -> String {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(3));
        self.current.fetch_sub(1, Ordering::SeqCst);
        data.to_uppercase()
    }
}

#[test]
fn test_slow_hash_never_concurrent() -> Result<()> {
    let signer = Arc::new(CountingSigner {
        current: AtomicUsize::new(0),
        max_seen: AtomicUsize::new(0),
        calls: AtomicUsize::new(0),
    });
    let report = sign_with_report(0..=11, &SignOpts::default(), signer.clone())?;
    assert_eq!(signer.max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(signer.calls.load(Ordering::SeqCst), 12);
    assert_eq!(report.peak_slow_calls, 1);
    assert_eq!(report.items, 12);
    Ok(())
}

/// Signer that counts how many distinct items are inside the six-way fan-out at once.
/// Fan-out inputs are `<index digit><stage A output>`; only they contain `~`.
#[derive(Default)]
struct FanOutTracker {
    active: Mutex<HashMap<String, usize>>,
    max_items: AtomicUsize,
}

impl Signer for FanOutTracker {
    fn fast(&self, data: &str) -> String {
        if !data.contains('~') {
            return reverse(data);
        }
        let item = data[1..].to_string();
        {
            let mut active = self.active.lock().unwrap();
            *active.entry(item.clone()).or_insert(0) += 1;
            self.max_items.fetch_max(active.len(), Ordering::SeqCst);
        }
        thread::sleep(Duration::from_millis(2));
        {
            let mut active = self.active.lock().unwrap();
            let n = active.get_mut(&item).unwrap();
            *n -= 1;
            if *n == 0 {
                active.remove(&item);
            }
        }
        reverse(data)
    }

    fn slow(&self, data: &str) -> String {
        data.to_uppercase()
    }
}

#[test]
fn test_fanout_admission_respected() -> Result<()> {
    let single_tracker = Arc::new(FanOutTracker::default());
    let single = sign_with_report(0..=7, &SignOpts::default(), single_tracker.clone())?;
    assert_eq!(single_tracker.max_items.load(Ordering::SeqCst), 1);

    let double_tracker = Arc::new(FanOutTracker::default());
    let opts = SignOpts {
        fanout_items: 2,
        ..SignOpts::default()
    };
    let double = sign_with_report(0..=7, &opts, double_tracker.clone())?;
    let seen = double_tracker.max_items.load(Ordering::SeqCst);
    assert!((1..=2).contains(&seen), "{seen} items fanned out at once");
    // Capacity changes scheduling only, never the result.
    assert_eq!(single.result, double.result);
    Ok(())
}

#[test]
fn test_large_range_completes() -> Result<()> {
    // Far more items than the process could hold as simultaneous threads.
    let out = sign_range(0..=100_000, &SignOpts::default(), Arc::new(Blake3Signer::new()))?;
    assert_eq!(out.split('_').count(), 100_001);
    Ok(())
}

#[test]
fn test_zero_fanout_items_is_clamped() -> Result<()> {
    let opts = SignOpts {
        fanout_items: 0,
        ..SignOpts::default()
    };
    let report = sign_with_report(0..=2, &opts, reverse_upper())?;
    assert_eq!(report.peak_fanout_items, 1);
    assert_eq!(report.result, expected_reverse_upper(&[0, 1, 2]));
    Ok(())
}
