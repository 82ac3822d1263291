use super::*;
use chrono::TimeZone;

fn fixed_clock() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 10, 19, 14, 3, 22)
        .single()
        .expect("unambiguous local time")
}

fn machine() -> EntryMachine {
    EntryMachine::new(Dataset::new(), EmptyBlockPolicy::Discard).with_clock(fixed_clock)
}

fn machine_with_open_block(name: &str, items: &[&str]) -> EntryMachine {
    let mut machine = machine();
    machine.submit_block_name(name).expect("open block");
    for item in items {
        machine.submit_item(item).expect("add item");
    }
    machine
}

#[test]
fn starts_awaiting_block_with_empty_session() {
    let machine = machine();
    assert_eq!(machine.session(), &SessionState::default());
    assert_eq!(machine.session().step, Step::AwaitingBlock);
    assert!(machine.dataset().is_empty());
}

#[test]
fn block_name_opens_item_step() {
    let mut machine = machine();
    let transition = machine.submit_block_name("Sala 1").expect("open");

    assert_eq!(
        transition,
        Transition::BlockOpened {
            name: "Sala 1".into()
        }
    );
    assert_eq!(machine.session().step, Step::AwaitingItem);
    assert_eq!(machine.session().current_block_name, "Sala 1");
    assert!(machine.session().message.is_empty());
}

#[test]
fn blank_block_name_is_rejected_without_state_change() {
    let mut machine = machine();
    let err = machine.submit_block_name("   ").expect_err("blank");

    assert_eq!(
        err,
        EntryError::EmptyInput {
            step: Step::AwaitingBlock
        }
    );
    assert_eq!(machine.session().step, Step::AwaitingBlock);
    assert!(machine.session().current_block_name.is_empty());
    assert_eq!(machine.session().message, MSG_BLOCK_REQUIRED);
}

#[test]
fn valid_block_name_clears_previous_error() {
    let mut machine = machine();
    let _ = machine.submit_block_name("");
    machine.submit_block_name("Sala 1").expect("open");
    assert!(machine.session().message.is_empty());
}

#[test]
fn items_are_appended_untrimmed_and_in_order() {
    let mut machine = machine_with_open_block("Sala 1", &[]);

    for (index, item) in [" TV001", "TV002 ", "TV001", "10"].iter().enumerate() {
        let transition = machine.submit_item(item).expect("item");
        assert_eq!(
            transition,
            Transition::ItemAdded {
                item: item.to_string(),
                count: index + 1
            }
        );
    }

    assert_eq!(
        machine.session().current_items,
        vec![" TV001", "TV002 ", "TV001", "10"]
    );
    assert!(machine.dataset().is_empty());
}

#[test]
fn commands_match_exact_untrimmed_value() {
    let mut machine = machine_with_open_block("Sala 1", &[]);
    machine.submit_item(" 0").expect("padded zero is an item");
    machine.submit_item("1 ").expect("padded one is an item");

    assert_eq!(machine.session().current_items, vec![" 0", "1 "]);
    assert_eq!(machine.session().step, Step::AwaitingItem);
    assert!(!machine.session().finished);
}

#[test]
fn blank_item_is_rejected_without_state_change() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    let err = machine.submit_item("\t").expect_err("blank");

    assert_eq!(
        err,
        EntryError::EmptyInput {
            step: Step::AwaitingItem
        }
    );
    assert_eq!(machine.session().current_items, vec!["TV001"]);
    assert_eq!(machine.session().step, Step::AwaitingItem);
    assert_eq!(machine.session().message, MSG_ITEM_REQUIRED);
}

#[test]
fn finishing_block_with_items_records_it() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001", "TV002"]);
    let transition = machine.submit_item("0").expect("finish block");

    let expected = Block::new("Sala 1", vec!["TV001".into(), "TV002".into()]);
    assert_eq!(
        transition,
        Transition::BlockRecorded {
            block: expected.clone()
        }
    );
    assert!(transition.touches_dataset());
    assert_eq!(machine.dataset().blocks(), &[expected]);
    assert_eq!(machine.session().step, Step::AwaitingBlock);
    assert!(machine.session().current_block_name.is_empty());
    assert!(machine.session().current_items.is_empty());
    assert_eq!(machine.session().message, MSG_BLOCK_SAVED);
}

#[test]
fn finishing_empty_block_discards_it_by_default() {
    let mut machine = machine_with_open_block("Sala vazia", &[]);
    let transition = machine.submit_item("0").expect("finish block");

    assert_eq!(
        transition,
        Transition::BlockDiscarded {
            name: "Sala vazia".into()
        }
    );
    assert!(!transition.touches_dataset());
    assert!(machine.dataset().is_empty());
    assert_eq!(machine.session().step, Step::AwaitingBlock);
    assert_eq!(machine.session().message, MSG_BLOCK_DISCARDED);
}

#[test]
fn record_policy_keeps_empty_blocks() {
    let mut machine =
        EntryMachine::new(Dataset::new(), EmptyBlockPolicy::Record).with_clock(fixed_clock);
    machine.submit_block_name("Depósito").expect("open");
    let transition = machine.submit_item("0").expect("finish block");

    assert_eq!(
        transition,
        Transition::BlockRecorded {
            block: Block::new("Depósito", vec![])
        }
    );
    assert_eq!(machine.dataset().len(), 1);
    assert_eq!(machine.session().message, MSG_BLOCK_SAVED_EMPTY);
}

#[test]
fn finish_all_records_open_block_and_reports() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    let transition = machine.submit_item("1").expect("finish all");

    let Transition::Finished { recorded, report } = transition else {
        panic!("expected finished transition");
    };
    assert_eq!(recorded, Some(Block::new("Sala 1", vec!["TV001".into()])));
    let report = report.expect("report");
    assert!(report.text.contains("BLOCO: Sala 1"));
    assert!(report.text.contains("Item 1: TV001"));

    let session = machine.session();
    assert!(session.finished);
    assert!(session.current_block_name.is_empty());
    assert!(session.current_items.is_empty());
    assert_eq!(session.message, MSG_FINISHED);
}

#[test]
fn finish_all_with_nothing_collected_still_finishes() {
    let mut machine = machine_with_open_block("Sala 1", &[]);
    let transition = machine.submit_item("1").expect("finish all");

    assert_eq!(
        transition,
        Transition::Finished {
            recorded: None,
            report: Err(ReportError::EmptyDataset)
        }
    );
    assert!(machine.session().finished);
    assert_eq!(machine.session().message, MSG_NOTHING_TO_REPORT);
}

#[test]
fn finish_all_applies_record_policy_to_open_block() {
    let mut machine =
        EntryMachine::new(Dataset::new(), EmptyBlockPolicy::Record).with_clock(fixed_clock);
    machine.submit_block_name("Sala 9").expect("open");
    let transition = machine.submit_item("1").expect("finish all");

    let Transition::Finished { recorded, report } = transition else {
        panic!("expected finished transition");
    };
    assert_eq!(recorded, Some(Block::new("Sala 9", vec![])));
    assert!(report
        .expect("report")
        .text
        .contains(crate::report::EMPTY_BLOCK_PLACEHOLDER));
}

#[test]
fn finished_session_rejects_further_submissions() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    machine.submit_item("1").expect("finish all");

    assert_eq!(
        machine.submit_block_name("Sala 2"),
        Err(EntryError::SessionFinished)
    );
    assert_eq!(machine.submit_item("TV002"), Err(EntryError::SessionFinished));
    assert_eq!(machine.submit_line("x"), Err(EntryError::SessionFinished));
    assert_eq!(machine.dataset().len(), 1);
}

#[test]
fn wrong_step_calls_are_rejected() {
    let mut machine = machine();
    assert_eq!(
        machine.submit_item("TV001"),
        Err(EntryError::UnexpectedStep {
            expected: Step::AwaitingItem,
            actual: Step::AwaitingBlock
        })
    );

    machine.submit_block_name("Sala 1").expect("open");
    assert_eq!(
        machine.submit_block_name("Sala 2"),
        Err(EntryError::UnexpectedStep {
            expected: Step::AwaitingBlock,
            actual: Step::AwaitingItem
        })
    );
    assert_eq!(machine.session().current_block_name, "Sala 1");
}

#[test]
fn submit_line_dispatches_by_step() {
    let mut machine = machine();
    assert!(matches!(
        machine.submit_line("0"),
        Ok(Transition::BlockOpened { .. })
    ));
    assert_eq!(machine.session().current_block_name, "0");
    assert!(matches!(
        machine.submit_line("TV001"),
        Ok(Transition::ItemAdded { count: 1, .. })
    ));
    assert!(matches!(
        machine.submit_line("0"),
        Ok(Transition::BlockRecorded { .. })
    ));
}

#[test]
fn restart_keeps_dataset() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    machine.submit_item("1").expect("finish all");

    assert_eq!(machine.restart(), Transition::Restarted);
    assert_eq!(machine.session(), &SessionState::default());
    assert_eq!(machine.dataset().len(), 1);
    machine
        .submit_block_name("Sala 2")
        .expect("accepts input again");
}

#[test]
fn erase_all_clears_everything() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    machine.submit_item("0").expect("finish block");
    machine.submit_block_name("Sala 2").expect("open");
    machine.submit_item("TV009").expect("item");

    assert_eq!(machine.erase_all(), Transition::Erased);
    assert!(machine.dataset().is_empty());
    assert_eq!(machine.session().step, Step::AwaitingBlock);
    assert!(machine.session().current_items.is_empty());
    assert!(!machine.session().finished);
    assert_eq!(machine.session().message, MSG_ERASED);
}

#[test]
fn report_covers_only_finalized_blocks() {
    let mut machine = machine_with_open_block("Sala 1", &["TV001"]);
    machine.submit_item("0").expect("finish block");
    machine.submit_block_name("Sala 2").expect("open");
    machine.submit_item("TV002").expect("item");

    let report = machine.report().expect("report");
    assert!(report.text.contains("BLOCO: Sala 1"));
    assert!(!report.text.contains("Sala 2"));
}

#[test]
fn guided_session_scenario() {
    let mut machine = machine();
    for line in ["Sala 1", "TV001", "TV002", "0", "Sala 2"] {
        machine.submit_line(line).expect("line accepted");
    }
    let transition = machine.submit_line("1").expect("finish all");

    assert!(matches!(
        transition,
        Transition::Finished { recorded: None, .. }
    ));
    assert_eq!(
        machine.dataset().blocks(),
        &[Block::new("Sala 1", vec!["TV001".into(), "TV002".into()])]
    );
    assert!(machine.session().finished);
}

#[test]
fn restored_dataset_is_extended_not_replaced() {
    let restored = Dataset::from(vec![Block::new("Antigo", vec!["A1".into()])]);
    let mut machine = EntryMachine::new(restored, EmptyBlockPolicy::Discard);
    machine.submit_block_name("Novo").expect("open");
    machine.submit_item("N1").expect("item");
    machine.submit_item("0").expect("finish block");

    let names: Vec<&str> = machine
        .dataset()
        .blocks()
        .iter()
        .map(|block| block.name.as_str())
        .collect();
    assert_eq!(names, vec!["Antigo", "Novo"]);
}
