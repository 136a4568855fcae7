//! Timeclock reconstruction engine
//!
//! Turns one legacy time-clock row into zero, one or two typed time events.
//! The engine is pure: employee resolution and writes belong to the
//! timeclock phase.
//!
//! 1. Clock times before 1970 carry no usable date and take the
//!    transaction date's date, keeping their time of day. Without a
//!    transaction date they are kept as stored.
//! 2. A span is completed from whatever endpoints exist (480 minute shift,
//!    08:00 start when only the transaction date is known) and a reversed
//!    pair is repaired the same way.
//! 3. A span emits a start/end pair, or one PTO event carrying the minutes.
//! 4. Without a span, any remaining timestamp emits one event.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use roster_common::db::{EntryType, TimeAction};
use serde::Serialize;

/// Assumed shift length when an endpoint is missing or reversed
pub const DEFAULT_SHIFT_MINUTES: i64 = 480;

/// Start of a shift synthesized from the transaction date alone
pub const DEFAULT_SHIFT_START: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(time) => time,
    None => panic!("08:00:00 is a valid time of day"),
};

/// Phrase table, checked in order as substrings of the folded text
const ACTION_PHRASES: &[(&[&str], TimeAction)] = &[
    (&["PTO", "PAID TIME OFF", "VACATION", "SICK", "HOLIDAY"], TimeAction::Pto),
    (&["CLOCK OUT", "CLOCKOUT", "PUNCH OUT"], TimeAction::ClockOut),
    (&["CLOCK IN", "CLOCKIN", "PUNCH IN"], TimeAction::ClockIn),
    (&["BREAK START", "START BREAK", "BREAK OUT"], TimeAction::BreakStart),
    (&["BREAK END", "END BREAK", "BREAK IN", "BREAK RETURN"], TimeAction::BreakEnd),
    (
        &["MEAL START", "START MEAL", "LUNCH START", "START LUNCH", "LUNCH OUT"],
        TimeAction::MealStart,
    ),
    (
        &["MEAL END", "END MEAL", "LUNCH END", "END LUNCH", "LUNCH IN", "LUNCH RETURN"],
        TimeAction::MealEnd,
    ),
    (&["ADJUSTMENT", "ADJUST", "CORRECTION"], TimeAction::Adjustment),
];

/// Uppercase words separated by single spaces: `clock-out` -> `CLOCK OUT`
fn fold(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_word(folded: &str, word: &str) -> bool {
    folded.split(' ').any(|w| w == word)
}

/// Classify transaction-type text into an action
///
/// `out_context` is set when the timestamp came from a clock-out field.
/// `single_event` enables the bare OUT/IN tokens, which only make sense
/// when one event stands for the whole row. Phrases and the BREAK, MEAL
/// and LUNCH fallbacks match anywhere in the text; OUT and IN must be
/// whole words.
pub fn classify_action(text: Option<&str>, out_context: bool, single_event: bool) -> TimeAction {
    let folded = fold(text.unwrap_or_default());

    for (phrases, action) in ACTION_PHRASES {
        if phrases.iter().any(|phrase| folded.contains(phrase)) {
            return *action;
        }
    }

    if folded.contains("BREAK") {
        return if out_context { TimeAction::BreakEnd } else { TimeAction::BreakStart };
    }
    if folded.contains("MEAL") || folded.contains("LUNCH") {
        return if out_context { TimeAction::MealEnd } else { TimeAction::MealStart };
    }

    if single_event {
        if contains_word(&folded, "OUT") {
            return TimeAction::ClockOut;
        }
        if contains_word(&folded, "IN") {
            return TimeAction::ClockIn;
        }
    }

    if out_context {
        TimeAction::ClockOut
    } else {
        TimeAction::ClockIn
    }
}

/// Normalized punch fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PunchInput<'a> {
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub transaction_date: Option<NaiveDateTime>,
    /// Transaction type label (or the raw code when it has no label)
    pub type_text: Option<&'a str>,
}

/// One event to write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedEvent {
    pub action: TimeAction,
    pub occurred_at: NaiveDateTime,
    pub entry_type: EntryType,
    pub minutes: Option<i64>,
    pub note: Option<String>,
}

/// What the engine had to infer for one row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionFlags {
    /// Clock times moved onto the transaction date
    pub anchored_dates: usize,
    /// Pre-1970 clock times kept as stored for lack of a transaction date
    pub unanchored_kept: usize,
    pub span_from_transaction_date: bool,
    pub span_completed_from_one_endpoint: bool,
    pub reversed_pair_repaired: bool,
    pub pto: bool,
    pub single_event: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    Events {
        events: Vec<ReconstructedEvent>,
        flags: ReconstructionFlags,
    },
    /// No usable timestamp at all
    MissingTimestamp,
}

fn has_usable_date(ts: &NaiveDateTime) -> bool {
    ts.year() >= 1970
}

fn anchor(
    value: Option<NaiveDateTime>,
    transaction_date: Option<NaiveDateTime>,
    flags: &mut ReconstructionFlags,
) -> Option<NaiveDateTime> {
    let value = value?;
    if has_usable_date(&value) {
        return Some(value);
    }
    match transaction_date {
        Some(date) => {
            flags.anchored_dates += 1;
            Some(date.date().and_time(value.time()))
        }
        None => {
            flags.unanchored_kept += 1;
            Some(value)
        }
    }
}

fn complete_span(
    clock_in: Option<NaiveDateTime>,
    clock_out: Option<NaiveDateTime>,
    transaction_date: Option<NaiveDateTime>,
    flags: &mut ReconstructionFlags,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let shift = Duration::minutes(DEFAULT_SHIFT_MINUTES);

    match (clock_in, clock_out) {
        (None, None) => {
            let start = transaction_date?.date().and_time(DEFAULT_SHIFT_START);
            let end = start.checked_add_signed(shift)?;
            flags.span_from_transaction_date = true;
            Some((start, end))
        }
        (Some(start), None) => {
            let end = start.checked_add_signed(shift)?;
            flags.span_completed_from_one_endpoint = true;
            Some((start, end))
        }
        (None, Some(end)) => {
            let start = end.checked_sub_signed(shift)?;
            flags.span_completed_from_one_endpoint = true;
            Some((start, end))
        }
        (Some(start), Some(end)) if end <= start => {
            let end = start.checked_add_signed(shift)?;
            flags.reversed_pair_repaired = true;
            Some((start, end))
        }
        (Some(start), Some(end)) => Some((start, end)),
    }
}

/// Reconstruct the events of one punch row
pub fn reconstruct(input: &PunchInput<'_>) -> Reconstruction {
    let mut flags = ReconstructionFlags::default();
    let note = input
        .type_text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let transaction_date = input.transaction_date;
    let clock_in = anchor(input.clock_in, transaction_date, &mut flags);
    let clock_out = anchor(input.clock_out, transaction_date, &mut flags);

    if let Some((start, end)) = complete_span(clock_in, clock_out, transaction_date, &mut flags) {
        let minutes = (end - start).num_minutes();
        let action = classify_action(input.type_text, false, false).as_start();

        let events = if action == TimeAction::Pto {
            flags.pto = true;
            vec![ReconstructedEvent {
                action,
                occurred_at: start,
                entry_type: EntryType::Imported,
                minutes: Some(minutes),
                note,
            }]
        } else {
            vec![
                ReconstructedEvent {
                    action,
                    occurred_at: start,
                    entry_type: EntryType::Imported,
                    minutes: None,
                    note: note.clone(),
                },
                ReconstructedEvent {
                    action: action.paired_end(),
                    occurred_at: end,
                    entry_type: EntryType::Imported,
                    minutes: Some(minutes),
                    note,
                },
            ]
        };
        return Reconstruction::Events { events, flags };
    }

    let (occurred_at, out_context) = match (clock_in, clock_out, transaction_date) {
        (Some(ts), _, _) => (ts, false),
        (None, Some(ts), _) => (ts, true),
        (None, None, Some(ts)) => (ts, false),
        (None, None, None) => return Reconstruction::MissingTimestamp,
    };

    flags.single_event = true;
    let action = classify_action(input.type_text, out_context, true);
    Reconstruction::Events {
        events: vec![ReconstructedEvent {
            action,
            occurred_at,
            entry_type: EntryType::Imported,
            minutes: None,
            note,
        }],
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn time_only(h: u32, min: u32) -> NaiveDateTime {
        ts(1899, 12, 30, h, min)
    }

    fn events(reconstruction: Reconstruction) -> (Vec<ReconstructedEvent>, ReconstructionFlags) {
        match reconstruction {
            Reconstruction::Events { events, flags } => (events, flags),
            other => panic!("expected events, got {:?}", other),
        }
    }

    #[test]
    fn test_classifier_phrases() {
        assert_eq!(classify_action(Some("Clock In"), false, false), TimeAction::ClockIn);
        assert_eq!(classify_action(Some("clock-out"), false, false), TimeAction::ClockOut);
        assert_eq!(classify_action(Some("BREAK RETURN"), false, false), TimeAction::BreakEnd);
        assert_eq!(classify_action(Some("lunch out"), false, false), TimeAction::MealStart);
        assert_eq!(classify_action(Some("Paid Time Off"), false, false), TimeAction::Pto);
        assert_eq!(classify_action(Some("Vacation day"), false, false), TimeAction::Pto);
        assert_eq!(classify_action(Some("Manager adjustment"), false, false), TimeAction::Adjustment);
    }

    #[test]
    fn test_classifier_fallbacks() {
        assert_eq!(classify_action(Some("Break"), false, false), TimeAction::BreakStart);
        assert_eq!(classify_action(Some("Break"), true, false), TimeAction::BreakEnd);
        assert_eq!(classify_action(Some("Meal"), false, false), TimeAction::MealStart);
        assert_eq!(classify_action(Some("LUNCH"), true, false), TimeAction::MealEnd);
        assert_eq!(classify_action(Some("Regular"), false, false), TimeAction::ClockIn);
        assert_eq!(classify_action(None, true, false), TimeAction::ClockOut);
    }

    #[test]
    fn test_classifier_matches_inside_fused_labels() {
        assert_eq!(classify_action(Some("Lunchbreak"), false, false), TimeAction::BreakStart);
        assert_eq!(classify_action(Some("BREAKTIME"), false, false), TimeAction::BreakStart);
        assert_eq!(classify_action(Some("breaktime"), true, false), TimeAction::BreakEnd);
        assert_eq!(classify_action(Some("Coffeebreak start"), false, false), TimeAction::BreakStart);
        assert_eq!(classify_action(Some("Mealtime"), false, false), TimeAction::MealStart);
        assert_eq!(classify_action(Some("LUNCHTIME"), true, false), TimeAction::MealEnd);
        assert_eq!(classify_action(Some("Sick leave"), false, false), TimeAction::Pto);
        assert_eq!(classify_action(Some("Readjustment"), false, false), TimeAction::Adjustment);
    }

    #[test]
    fn test_fused_break_label_spans_as_break() {
        let input = PunchInput {
            clock_in: Some(ts(2024, 1, 2, 10, 0)),
            clock_out: Some(ts(2024, 1, 2, 10, 15)),
            type_text: Some("BREAKTIME"),
            ..Default::default()
        };
        let (events, _) = events(reconstruct(&input));

        assert_eq!(events[0].action, TimeAction::BreakStart);
        assert_eq!(events[1].action, TimeAction::BreakEnd);
        assert_eq!(events[1].minutes, Some(15));
    }

    #[test]
    fn test_bare_tokens_only_in_single_event_mode() {
        assert_eq!(classify_action(Some("OUT"), false, true), TimeAction::ClockOut);
        assert_eq!(classify_action(Some("in"), true, true), TimeAction::ClockIn);
        assert_eq!(classify_action(Some("OUT"), false, false), TimeAction::ClockIn);
        // Words merely containing the letters do not count
        assert_eq!(classify_action(Some("INVENTORY"), false, true), TimeAction::ClockIn);
        assert_eq!(classify_action(Some("TIMEOUT"), true, true), TimeAction::ClockOut);
    }

    #[test]
    fn test_span_mode_coerces_end_actions_to_start() {
        let input = PunchInput {
            clock_in: Some(ts(2024, 1, 2, 12, 0)),
            clock_out: Some(ts(2024, 1, 2, 12, 30)),
            type_text: Some("Break End"),
            ..Default::default()
        };
        let (events, _) = events(reconstruct(&input));

        assert_eq!(events[0].action, TimeAction::BreakStart);
        assert_eq!(events[1].action, TimeAction::BreakEnd);
        assert_eq!(events[1].minutes, Some(30));
    }

    #[test]
    fn test_transaction_date_only_synthesizes_shift() {
        let input = PunchInput {
            transaction_date: Some(ts(2024, 1, 2, 0, 0)),
            type_text: Some("Regular"),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&input));

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, TimeAction::ClockIn);
        assert_eq!(events[0].occurred_at, ts(2024, 1, 2, 8, 0));
        assert_eq!(events[0].minutes, None);
        assert_eq!(events[1].action, TimeAction::ClockOut);
        assert_eq!(events[1].occurred_at, ts(2024, 1, 2, 16, 0));
        assert_eq!(events[1].minutes, Some(480));
        assert_eq!(events[1].note.as_deref(), Some("Regular"));
        assert!(flags.span_from_transaction_date);
        assert!(events.iter().all(|e| e.entry_type == EntryType::Imported));
    }

    #[test]
    fn test_reversed_pair_is_repaired() {
        let input = PunchInput {
            clock_in: Some(ts(2024, 1, 2, 9, 0)),
            clock_out: Some(ts(2024, 1, 2, 8, 0)),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&input));

        assert_eq!(events[1].occurred_at, ts(2024, 1, 2, 17, 0));
        assert_eq!(events[1].minutes, Some(480));
        assert!(flags.reversed_pair_repaired);
        assert_eq!(events[0].note, None);
    }

    #[test]
    fn test_single_endpoint_completion() {
        let only_in = PunchInput {
            clock_in: Some(ts(2024, 1, 2, 7, 15)),
            ..Default::default()
        };
        let (events_in, flags) = events(reconstruct(&only_in));
        assert_eq!(events_in[1].occurred_at, ts(2024, 1, 2, 15, 15));
        assert!(flags.span_completed_from_one_endpoint);

        let only_out = PunchInput {
            clock_out: Some(ts(2024, 1, 2, 17, 0)),
            ..Default::default()
        };
        let (events_out, _) = events(reconstruct(&only_out));
        assert_eq!(events_out[0].occurred_at, ts(2024, 1, 2, 9, 0));
        assert_eq!(events_out[1].minutes, Some(480));
    }

    #[test]
    fn test_time_only_values_anchor_to_transaction_date() {
        let input = PunchInput {
            clock_in: Some(time_only(7, 30)),
            clock_out: Some(time_only(16, 45)),
            transaction_date: Some(ts(2023, 11, 6, 0, 0)),
            type_text: None,
        };
        let (events, flags) = events(reconstruct(&input));

        assert_eq!(flags.anchored_dates, 2);
        assert_eq!(events[0].occurred_at, ts(2023, 11, 6, 7, 30));
        assert_eq!(events[1].occurred_at, ts(2023, 11, 6, 16, 45));
        assert_eq!(events[1].minutes, Some(555));
    }

    #[test]
    fn test_pto_emits_one_event_with_minutes() {
        let input = PunchInput {
            clock_in: Some(ts(2024, 5, 1, 8, 0)),
            clock_out: Some(ts(2024, 5, 1, 12, 0)),
            type_text: Some("PTO"),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&input));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TimeAction::Pto);
        assert_eq!(events[0].occurred_at, ts(2024, 5, 1, 8, 0));
        assert_eq!(events[0].minutes, Some(240));
        assert!(flags.pto);
    }

    #[test]
    fn test_minutes_are_floored() {
        let input = PunchInput {
            clock_in: Some(ts(2024, 5, 1, 8, 0)),
            clock_out: Some(
                NaiveDate::from_ymd_opt(2024, 5, 1)
                    .unwrap()
                    .and_hms_opt(8, 10, 59)
                    .unwrap(),
            ),
            ..Default::default()
        };
        let (events, _) = events(reconstruct(&input));
        assert_eq!(events[1].minutes, Some(10));
    }

    #[test]
    fn test_no_timestamp_is_missing() {
        assert_eq!(reconstruct(&PunchInput::default()), Reconstruction::MissingTimestamp);
    }

    #[test]
    fn test_time_only_value_without_transaction_date_is_kept() {
        let unanchored = PunchInput {
            clock_in: Some(time_only(8, 0)),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&unanchored));

        assert_eq!(flags.unanchored_kept, 1);
        assert_eq!(flags.anchored_dates, 0);
        assert!(flags.span_completed_from_one_endpoint);
        assert_eq!(events[0].occurred_at, time_only(8, 0));
        assert_eq!(events[1].occurred_at, time_only(16, 0));
        assert_eq!(events[1].minutes, Some(480));
    }

    #[test]
    fn test_pre_1970_transaction_date_still_anchors_and_spans() {
        let input = PunchInput {
            clock_in: Some(time_only(9, 0)),
            transaction_date: Some(ts(1965, 3, 1, 0, 0)),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&input));
        assert_eq!(flags.anchored_dates, 1);
        assert_eq!(events[0].occurred_at, ts(1965, 3, 1, 9, 0));

        let date_only = PunchInput {
            transaction_date: Some(ts(1965, 3, 1, 0, 0)),
            ..Default::default()
        };
        let (events, flags) = self::events(reconstruct(&date_only));
        assert!(flags.span_from_transaction_date);
        assert_eq!(events[0].occurred_at, ts(1965, 3, 1, 8, 0));
    }

    #[test]
    fn test_unrepresentable_span_falls_back_to_single_event() {
        let input = PunchInput {
            clock_out: Some(NaiveDateTime::MIN),
            type_text: Some("Punch"),
            ..Default::default()
        };
        let (events, flags) = events(reconstruct(&input));
        assert!(flags.single_event);
        assert_eq!(flags.unanchored_kept, 1);
        assert_eq!(events[0].action, TimeAction::ClockOut);
        assert_eq!(events[0].occurred_at, NaiveDateTime::MIN);

        let late = NaiveDateTime::MAX - Duration::minutes(1);
        let input = PunchInput {
            clock_in: Some(late),
            type_text: Some("OUT"),
            ..Default::default()
        };
        let (events, flags) = self::events(reconstruct(&input));
        assert!(flags.single_event);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, TimeAction::ClockOut);
        assert_eq!(events[0].occurred_at, late);
        assert_eq!(events[0].minutes, None);
    }
}
