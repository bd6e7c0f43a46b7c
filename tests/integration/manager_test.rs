use anyhow::Result;
use rand::rngs::mock::StepRng;
use pagesim::memory::FrameTable;
use pagesim::{
    FrameId, MemoryManager, PageNumber, ProcessId, ReferenceOutcome, ReplacementPolicy,
};

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_manager, stress};

const P1: ProcessId = ProcessId(1);
const P2: ProcessId = ProcessId(2);

fn ages(frames: &FrameTable) -> Vec<u64> {
    frames.iter().map(|(_, frame)| frame.age).collect()
}

#[test]
fn test_fifo_evicts_oldest_page() -> Result<()> {
    let mut mm = create_test_manager(2, ReplacementPolicy::Fifo)?;
    mm.start(P1, 3)?;

    assert_eq!(mm.reference(P1, PageNumber(1)), ReferenceOutcome::FaultNoEviction);
    assert_eq!(mm.fault_count(), 1);
    assert_eq!(mm.reference(P1, PageNumber(2)), ReferenceOutcome::FaultNoEviction);
    assert_eq!(mm.fault_count(), 2);

    // both frames are full, page 1 arrived first
    assert_eq!(mm.reference(P1, PageNumber(3)), ReferenceOutcome::FaultWithEviction);
    assert_eq!(mm.fault_count(), 3);
    let space = mm.address_space(P1).unwrap();
    assert_eq!(space.frame_of(0), None);
    assert_eq!(space.frame_of(2).map(FrameId::index), Some(0));

    assert_eq!(mm.reference(P1, PageNumber(1)), ReferenceOutcome::FaultWithEviction);
    assert_eq!(mm.fault_count(), 4);
    assert_eq!(mm.reference_count(), 4);
    mm.verify()?;

    Ok(())
}

#[test]
fn test_lru_evicts_least_recent() -> Result<()> {
    let mut mm = create_test_manager(2, ReplacementPolicy::Lru)?;
    mm.start(P1, 3)?;
    mm.reference(P1, PageNumber(1));
    mm.reference(P1, PageNumber(2));

    assert_eq!(mm.reference(P1, PageNumber(1)), ReferenceOutcome::Resident);
    assert_eq!(ages(mm.frames()), vec![0, 1]);

    // page 2 sits in the older frame
    let page_two_frame = mm.address_space(P1).unwrap().frame_of(1);
    assert_eq!(mm.reference(P1, PageNumber(3)), ReferenceOutcome::FaultWithEviction);

    let space = mm.address_space(P1).unwrap();
    assert_eq!(space.frame_of(1), None);
    assert_eq!(space.frame_of(2), page_two_frame);
    assert!(space.frame_of(0).is_some());
    mm.verify()?;

    Ok(())
}

#[test]
fn test_lru_reference_resets_age_and_ages_others() -> Result<()> {
    let mut mm = create_test_manager(4, ReplacementPolicy::Lru)?;
    mm.start(P1, 6)?;
    for page in [1, 2, 3, 4, 2, 5, 1, 6, 3] {
        let before = ages(mm.frames());
        mm.reference(P1, PageNumber(page));

        let frame_id = mm.address_space(P1).unwrap().frame_of(page - 1).unwrap();
        let after = ages(mm.frames());
        for (idx, (_, frame)) in mm.frames().iter().enumerate() {
            if idx == frame_id.index() {
                assert_eq!(frame.age, 0);
            } else if frame.valid {
                assert!(after[idx] > before[idx]);
            }
        }
    }
    mm.verify()?;

    Ok(())
}

#[test]
fn test_lru_prefers_strictly_older_frame() -> Result<()> {
    let mut mm = create_test_manager(2, ReplacementPolicy::Lru)?;
    mm.start(P1, 1)?;
    mm.start(P2, 2)?;
    mm.reference(P1, PageNumber(1));
    mm.reference(P2, PageNumber(1));

    // freeing frame 0 and refilling it leaves frame 1 at age 1
    mm.terminate(P1);
    mm.start(P1, 1)?;
    mm.reference(P1, PageNumber(1));
    assert_eq!(ages(mm.frames()), vec![0, 1]);

    // the strictly older frame goes first
    assert_eq!(mm.reference(P2, PageNumber(2)), ReferenceOutcome::FaultWithEviction);
    assert_eq!(mm.address_space(P2).unwrap().frame_of(1).map(FrameId::index), Some(1));
    mm.verify()?;

    Ok(())
}

#[test]
fn test_random_single_frame() -> Result<()> {
    let mut mm = create_test_manager(1, ReplacementPolicy::Random)?;
    mm.start(P1, 1)?;
    mm.start(P2, 1)?;

    assert_eq!(mm.reference(P1, PageNumber(1)), ReferenceOutcome::FaultNoEviction);
    assert!(mm.frames().valid_count() <= 1);
    assert_eq!(mm.reference(P2, PageNumber(1)), ReferenceOutcome::FaultWithEviction);
    assert!(mm.frames().valid_count() <= 1);
    assert_eq!(mm.address_space(P1).unwrap().resident_count(), 0);
    mm.verify()?;

    Ok(())
}

#[test]
fn test_random_with_deterministic_stream() -> Result<()> {
    // gen_range scales the high bits, so a constant u64::MAX / 2 + 1 always picks frame 1 of 2
    let rng = StepRng::new(u64::MAX / 2 + 1, 0);
    let mut mm = MemoryManager::with_rng(2, ReplacementPolicy::Random, Box::new(rng))?;
    mm.start(P1, 6)?;
    for page in 1..=6 {
        mm.reference(P1, PageNumber(page));
        mm.verify()?;
    }
    assert_eq!(mm.fault_count(), 6);
    assert_eq!(mm.stats().evictions, 4);

    // frame 0 keeps page 1, frame 1 holds the latest page
    let space = mm.address_space(P1).unwrap();
    assert_eq!(space.frame_of(0).map(FrameId::index), Some(0));
    assert_eq!(space.frame_of(5).map(FrameId::index), Some(1));
    assert_eq!(space.resident_count(), 2);

    Ok(())
}

#[test]
fn test_terminate_frees_frames() -> Result<()> {
    let mut mm = create_test_manager(2, ReplacementPolicy::Fifo)?;
    mm.start(P1, 3)?;
    for page in [1, 2, 3, 1] {
        mm.reference(P1, PageNumber(page));
    }
    let faults = mm.fault_count();

    mm.terminate(P1);
    assert_eq!(mm.fault_count(), faults);
    assert_eq!(mm.frames().valid_count(), 0);
    assert!(mm.frames().iter().all(|(_, frame)| frame.owner.is_none() && frame.age == 0));
    assert!(mm.fifo_queue().is_empty());
    assert!(mm.address_space(P1).is_none());
    mm.verify()?;

    Ok(())
}

#[test]
fn test_terminate_leaves_other_processes_intact() -> Result<()> {
    for policy in ReplacementPolicy::ALL {
        let mut mm = create_test_manager(3, policy)?;
        mm.start(P1, 4)?;
        mm.start(P2, 4)?;
        for (pid, page) in [(P1, 1), (P2, 1), (P1, 2), (P2, 2), (P1, 3), (P2, 3)] {
            mm.reference(pid, PageNumber(page));
        }

        let owned: Vec<FrameId> = mm
            .frames()
            .iter()
            .filter(|(_, frame)| frame.owner == Some(P1))
            .map(|(frame_id, _)| frame_id)
            .collect();

        mm.terminate(P1);
        for frame_id in &owned {
            assert!(!mm.frames().get(*frame_id).unwrap().valid);
        }
        let survivors: Vec<FrameId> = mm.address_space(P2).unwrap().mapped().map(|(_, f)| f).collect();
        assert!(survivors.iter().all(|frame_id| !owned.contains(frame_id)));
        mm.verify()?;
    }

    Ok(())
}

#[test]
fn test_fifo_purge_keeps_order() -> Result<()> {
    let mut mm = create_test_manager(4, ReplacementPolicy::Fifo)?;
    mm.start(P1, 2)?;
    mm.start(P2, 2)?;
    mm.reference(P1, PageNumber(1));
    mm.reference(P2, PageNumber(1));
    mm.reference(P1, PageNumber(2));
    mm.reference(P2, PageNumber(2));

    mm.terminate(P1);
    let queue: Vec<usize> = mm.fifo_queue().into_iter().map(FrameId::index).collect();
    assert_eq!(queue, vec![1, 3]);

    // freed frames are refilled left to right and join the tail
    mm.start(ProcessId(3), 2)?;
    mm.reference(ProcessId(3), PageNumber(1));
    let queue: Vec<usize> = mm.fifo_queue().into_iter().map(FrameId::index).collect();
    assert_eq!(queue, vec![1, 3, 0]);
    mm.verify()?;

    Ok(())
}

#[test]
fn test_invalid_references_are_counted() -> Result<()> {
    let mut mm = create_test_manager(2, ReplacementPolicy::Fifo)?;
    mm.start(P1, 2)?;

    assert_eq!(mm.reference(P1, PageNumber(0)), ReferenceOutcome::InvalidReference);
    assert_eq!(mm.reference(P1, PageNumber(3)), ReferenceOutcome::InvalidReference);
    assert_eq!(mm.reference_count(), 2);
    assert_eq!(mm.fault_count(), 0);
    assert_eq!(mm.frames().valid_count(), 0);
    assert_eq!(mm.address_space(P1).unwrap().resident_count(), 0);

    Ok(())
}

#[test]
fn test_invariants_hold_under_random_load() -> Result<()> {
    for policy in ReplacementPolicy::ALL {
        for (frames, seed) in [(1, 11), (3, 12), (8, 13)] {
            let mut mm = create_test_manager(frames, policy)?;
            stress(&mut mm, seed, 2_000)?;
        }
    }

    Ok(())
}
