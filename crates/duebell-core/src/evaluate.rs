//! Due-date evaluation.
//!
//! One sequential pass over the sheet snapshot: each row is classified
//! as due-soon, overdue, or inert against a reference date, with the
//! status store consulted for suppression and first-seen registration.
//! Row-level data problems (missing fields, malformed dates) are logged
//! and skipped; only store I/O failures propagate.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::error::StoreError;
use crate::sheet::{HeaderMap, RowView};
use crate::storage::{ReminderStatus, StatusStore};

pub const COL_ITEM_NAME: &str = "ItemName";
pub const COL_DUE_DATE: &str = "DueDate";
pub const COL_ADVANCE_DAYS: &str = "AdvanceDays";
pub const COL_POLICY_NO: &str = "Policy/Inv. No.";
pub const COL_AMOUNT: &str = "Amount";
pub const COL_PAYEE: &str = "Name on Inv.";
pub const COL_BRANCH: &str = "Place/Branch";

/// Sheet due dates are month/day/year, e.g. `03/15/2025`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Join key against the status store. Intentionally plain string
/// concatenation so keys stay human-readable; two rows with the same
/// name and date are the same logical item.
pub fn item_id(item_name: &str, due_date_str: &str) -> String {
    format!("{}-{}", item_name.replace(' ', "-"), due_date_str)
}

/// Parse the comma-separated advance-notice offsets. Entries are
/// trimmed; empty or unparseable entries contribute nothing.
pub fn parse_advance_days(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            match part.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("ignoring unparseable advance-days entry '{part}'");
                    None
                }
            }
        })
        .collect()
}

/// One alert to deliver for a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// `days_until_due` matched an advance-notice offset.
    DueSoon {
        item_name: String,
        due_date: String,
        days_until_due: i64,
        policy_no: String,
        amount: String,
        payee: String,
        branch: String,
    },
    /// The due date is in the past.
    Overdue {
        item_name: String,
        due_date: String,
        days_overdue: i64,
        policy_no: String,
    },
}

impl NotificationEvent {
    /// Email subject line.
    pub fn subject(&self) -> String {
        match self {
            NotificationEvent::DueSoon {
                item_name,
                days_until_due,
                ..
            } => format!("Reminder: {item_name} in {days_until_due} days"),
            NotificationEvent::Overdue { item_name, .. } => format!("OVERDUE: {item_name}"),
        }
    }

    /// Plaintext email body.
    pub fn email_body(&self) -> String {
        match self {
            NotificationEvent::DueSoon {
                item_name,
                due_date,
                policy_no,
                amount,
                payee,
                branch,
                ..
            } => format!(
                "This is a reminder that your '{item_name}' is due on {due_date}.\n\n\
                 Policy/Inv. No.: {policy_no}\n\
                 Amount: {amount}\n\
                 Name on Inv.: {payee}\n\
                 Place/Branch: {branch}"
            ),
            NotificationEvent::Overdue {
                due_date,
                days_overdue,
                policy_no,
                ..
            } => format!(
                "This item was due on {due_date} and is overdue by {days_overdue} days.\n\
                 Policy No: {policy_no}"
            ),
        }
    }

    /// Chat message. Overdue carries the full body with a distinct
    /// severity marker; due-soon is the subject line only (the detailed
    /// body goes to email).
    pub fn chat_text(&self) -> String {
        match self {
            NotificationEvent::DueSoon { .. } => format!("🔔 {}", self.subject()),
            NotificationEvent::Overdue { .. } => {
                format!("🚨 {}\n{}", self.subject(), self.email_body())
            }
        }
    }
}

/// Evaluate a single row. Returns the event to deliver, if any.
///
/// Status bookkeeping happens here regardless of whether an event
/// fires: a first-seen ItemID is registered `Active`, and a `Handled`
/// one short-circuits before any date math.
///
/// # Errors
/// Only store I/O failures propagate; bad row data is logged and
/// yields `None`.
pub fn evaluate_row(
    row: &RowView<'_>,
    today: NaiveDate,
    store: &dyn StatusStore,
) -> Result<Option<NotificationEvent>, StoreError> {
    let item_name = row.field(COL_ITEM_NAME);
    let due_date_str = row.field(COL_DUE_DATE);

    if item_name.is_empty() || due_date_str.is_empty() {
        debug!("skipping row: missing ItemName or DueDate");
        return Ok(None);
    }

    let item_id = item_id(item_name, due_date_str);

    let status = store.get(&item_id)?;
    if status == Some(ReminderStatus::Handled) {
        debug!("'{item_id}' is handled, skipping");
        return Ok(None);
    }
    if status.is_none() {
        debug!("new item '{item_id}', registering as Active");
        store.put(&item_id, ReminderStatus::Active)?;
    }

    let due_date = match NaiveDate::parse_from_str(due_date_str, DATE_FORMAT) {
        Ok(d) => d,
        Err(_) => {
            warn!("could not parse due date '{due_date_str}' for '{item_name}' (expected MM/DD/YYYY)");
            return Ok(None);
        }
    };
    let days_until_due = (due_date - today).num_days();

    if days_until_due < 0 {
        return Ok(Some(NotificationEvent::Overdue {
            item_name: item_name.to_string(),
            due_date: due_date_str.to_string(),
            days_overdue: -days_until_due,
            policy_no: row.display_field(COL_POLICY_NO).to_string(),
        }));
    }

    let advance_days = parse_advance_days(row.field(COL_ADVANCE_DAYS));
    if advance_days.contains(&days_until_due) {
        return Ok(Some(NotificationEvent::DueSoon {
            item_name: item_name.to_string(),
            due_date: due_date_str.to_string(),
            days_until_due,
            policy_no: row.display_field(COL_POLICY_NO).to_string(),
            amount: row.display_field(COL_AMOUNT).to_string(),
            payee: row.display_field(COL_PAYEE).to_string(),
            branch: row.display_field(COL_BRANCH).to_string(),
        }));
    }

    Ok(None)
}

/// Evaluate a whole snapshot. The first row is the header row; an empty
/// snapshot is a successful no-op.
pub fn evaluate_sheet(
    values: &[Vec<String>],
    today: NaiveDate,
    store: &dyn StatusStore,
) -> Result<Vec<NotificationEvent>, StoreError> {
    let Some((header_row, data_rows)) = values.split_first() else {
        return Ok(Vec::new());
    };
    let headers = HeaderMap::from_row(header_row);

    let mut events = Vec::new();
    for (i, cells) in data_rows.iter().enumerate() {
        // +1 for 0-index, +1 for the header row: matches the sheet UI.
        let row_num = i + 2;
        let row = RowView::new(&headers, cells);
        debug!("processing row {row_num}: {}", row.field(COL_ITEM_NAME));
        if let Some(event) = evaluate_row(&row, today, store)? {
            events.push(event);
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store that records every put.
    #[derive(Default)]
    struct MemStore {
        map: RefCell<HashMap<String, ReminderStatus>>,
        puts: RefCell<Vec<(String, ReminderStatus)>>,
    }

    impl MemStore {
        fn with(entries: &[(&str, ReminderStatus)]) -> Self {
            let store = Self::default();
            for (k, v) in entries {
                store.map.borrow_mut().insert(k.to_string(), *v);
            }
            store
        }

        fn puts(&self) -> Vec<(String, ReminderStatus)> {
            self.puts.borrow().clone()
        }
    }

    impl StatusStore for MemStore {
        fn get(&self, item_id: &str) -> Result<Option<ReminderStatus>, StoreError> {
            Ok(self.map.borrow().get(item_id).copied())
        }

        fn put(&self, item_id: &str, status: ReminderStatus) -> Result<(), StoreError> {
            self.map.borrow_mut().insert(item_id.to_string(), status);
            self.puts.borrow_mut().push((item_id.to_string(), status));
            Ok(())
        }

        fn list(&self) -> Result<Vec<(String, ReminderStatus)>, StoreError> {
            let mut out: Vec<_> = self
                .map
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect();
            out.sort();
            Ok(out)
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn strings(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    fn car_insurance_sheet() -> Vec<Vec<String>> {
        vec![
            strings(&[
                "ItemName",
                "DueDate",
                "AdvanceDays",
                "Policy/Inv. No.",
                "Amount",
                "Name on Inv.",
                "Place/Branch",
            ]),
            strings(&[
                "Car Insurance",
                "03/01/2025",
                "7,3,1",
                "POL-991",
                "450.00",
                "A. Driver",
                "Main St",
            ]),
        ]
    }

    #[test]
    fn item_id_replaces_spaces_and_appends_date() {
        assert_eq!(
            item_id("Car Insurance", "03/01/2025"),
            "Car-Insurance-03/01/2025"
        );
        assert_eq!(item_id("Rent", "01/01/2026"), "Rent-01/01/2026");
    }

    #[test]
    fn parse_advance_days_trims_and_drops_junk() {
        assert_eq!(parse_advance_days("7,3,1"), vec![7, 3, 1]);
        assert_eq!(parse_advance_days(" 7 , 3 ,1 "), vec![7, 3, 1]);
        assert_eq!(parse_advance_days(""), Vec::<i64>::new());
        assert_eq!(parse_advance_days("7,,x,3"), vec![7, 3]);
        assert_eq!(parse_advance_days("0"), vec![0]);
    }

    // Scenario A: 7 days out, 7 in the advance list -> DueSoon.
    #[test]
    fn due_soon_fires_on_advance_day_match() {
        let store = MemStore::default();
        let events = evaluate_sheet(&car_insurance_sheet(), date("02/22/2025"), &store).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::DueSoon {
                item_name,
                days_until_due,
                amount,
                ..
            } => {
                assert_eq!(item_name, "Car Insurance");
                assert_eq!(*days_until_due, 7);
                assert_eq!(amount, "450.00");
            }
            other => panic!("expected DueSoon, got {other:?}"),
        }
    }

    // Scenario B: 4 days past due -> Overdue, magnitude 4.
    #[test]
    fn overdue_fires_with_day_magnitude() {
        let store = MemStore::default();
        let events = evaluate_sheet(&car_insurance_sheet(), date("03/05/2025"), &store).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::Overdue {
                days_overdue,
                policy_no,
                ..
            } => {
                assert_eq!(*days_overdue, 4);
                assert_eq!(policy_no, "POL-991");
            }
            other => panic!("expected Overdue, got {other:?}"),
        }
    }

    // Scenario C: 9 days out, not in {7,3,1} -> nothing.
    #[test]
    fn no_event_when_days_not_in_advance_set() {
        let store = MemStore::default();
        let events = evaluate_sheet(&car_insurance_sheet(), date("02/20/2025"), &store).unwrap();
        assert!(events.is_empty());
    }

    // Scenario D: Handled item stays silent and gets no put.
    #[test]
    fn handled_item_is_suppressed_without_a_put() {
        let store = MemStore::with(&[("Car-Insurance-03/01/2025", ReminderStatus::Handled)]);
        let events = evaluate_sheet(&car_insurance_sheet(), date("03/05/2025"), &store).unwrap();
        assert!(events.is_empty());
        assert!(store.puts().is_empty());
    }

    // Scenario E: DueDate header missing -> skipped, no mutation.
    #[test]
    fn missing_due_date_column_skips_row() {
        let sheet = vec![
            strings(&["ItemName", "AdvanceDays"]),
            strings(&["Car Insurance", "7,3,1"]),
        ];
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        assert!(events.is_empty());
        assert!(store.puts().is_empty());
    }

    #[test]
    fn overdue_ignores_advance_days_contents() {
        let mut sheet = car_insurance_sheet();
        sheet[1][2] = String::new(); // no advance days at all
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("04/01/2025"), &store).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], NotificationEvent::Overdue { .. }));
    }

    #[test]
    fn first_seen_registers_active_even_without_event() {
        let store = MemStore::default();
        // Scenario C date: no notification fires, but the put happens.
        evaluate_sheet(&car_insurance_sheet(), date("02/20/2025"), &store).unwrap();
        assert_eq!(
            store.puts(),
            vec![(
                "Car-Insurance-03/01/2025".to_string(),
                ReminderStatus::Active
            )]
        );
    }

    #[test]
    fn second_run_does_not_reregister() {
        let store = MemStore::default();
        evaluate_sheet(&car_insurance_sheet(), date("02/20/2025"), &store).unwrap();
        evaluate_sheet(&car_insurance_sheet(), date("02/20/2025"), &store).unwrap();
        assert_eq!(store.puts().len(), 1);
    }

    #[test]
    fn due_today_requires_zero_in_advance_days() {
        let mut sheet = car_insurance_sheet();
        let today = date("03/01/2025");

        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, today, &store).unwrap();
        assert!(events.is_empty(), "0 not in {{7,3,1}} -> no event");

        sheet[1][2] = "7,3,1,0".to_string();
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, today, &store).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            NotificationEvent::DueSoon {
                days_until_due: 0,
                ..
            }
        ));
    }

    #[test]
    fn malformed_date_is_skipped_but_still_registered() {
        let mut sheet = car_insurance_sheet();
        sheet[1][1] = "2025-03-01".to_string(); // wrong format
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        assert!(events.is_empty());
        // Registration happens before date parsing, as in the store-first flow.
        assert_eq!(store.puts().len(), 1);
    }

    #[test]
    fn missing_display_columns_default_to_na() {
        let sheet = vec![
            strings(&["ItemName", "DueDate", "AdvanceDays"]),
            strings(&["Car Insurance", "03/01/2025", "7"]),
        ];
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        match &events[0] {
            NotificationEvent::DueSoon {
                policy_no,
                amount,
                payee,
                branch,
                ..
            } => {
                assert_eq!(policy_no, "N/A");
                assert_eq!(amount, "N/A");
                assert_eq!(payee, "N/A");
                assert_eq!(branch, "N/A");
            }
            other => panic!("expected DueSoon, got {other:?}"),
        }
    }

    #[test]
    fn reordered_columns_still_resolve() {
        let sheet = vec![
            strings(&["AdvanceDays", "DueDate", "ItemName"]),
            strings(&["7,3,1", "03/01/2025", "Car Insurance"]),
        ];
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn short_row_is_skipped_not_an_error() {
        let mut sheet = car_insurance_sheet();
        sheet[1] = strings(&["Car Insurance"]); // row ends before DueDate
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        assert!(events.is_empty());
        assert!(store.puts().is_empty());
    }

    #[test]
    fn empty_sheet_is_a_no_op() {
        let store = MemStore::default();
        assert!(evaluate_sheet(&[], date("02/22/2025"), &store)
            .unwrap()
            .is_empty());
        // Header-only sheet too.
        let sheet = vec![strings(&["ItemName", "DueDate"])];
        assert!(evaluate_sheet(&sheet, date("02/22/2025"), &store)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn one_event_per_qualifying_row_in_order() {
        let sheet = vec![
            strings(&["ItemName", "DueDate", "AdvanceDays"]),
            strings(&["Rent", "02/01/2025", "3"]),         // overdue
            strings(&["Car Insurance", "03/01/2025", "7"]), // due soon
            strings(&["Gym", "06/01/2025", "1"]),           // inert
        ];
        let store = MemStore::default();
        let events = evaluate_sheet(&sheet, date("02/22/2025"), &store).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], NotificationEvent::Overdue { .. }));
        assert!(matches!(events[1], NotificationEvent::DueSoon { .. }));
    }

    #[test]
    fn message_formats_match_the_notification_contract() {
        let due_soon = NotificationEvent::DueSoon {
            item_name: "Car Insurance".into(),
            due_date: "03/01/2025".into(),
            days_until_due: 7,
            policy_no: "POL-991".into(),
            amount: "450.00".into(),
            payee: "A. Driver".into(),
            branch: "Main St".into(),
        };
        assert_eq!(due_soon.subject(), "Reminder: Car Insurance in 7 days");
        assert_eq!(
            due_soon.chat_text(),
            "🔔 Reminder: Car Insurance in 7 days"
        );
        let body = due_soon.email_body();
        assert!(body.starts_with("This is a reminder that your 'Car Insurance' is due on 03/01/2025."));
        assert!(body.contains("Policy/Inv. No.: POL-991"));
        assert!(body.contains("Amount: 450.00"));
        assert!(body.contains("Name on Inv.: A. Driver"));
        assert!(body.contains("Place/Branch: Main St"));

        let overdue = NotificationEvent::Overdue {
            item_name: "Car Insurance".into(),
            due_date: "03/01/2025".into(),
            days_overdue: 4,
            policy_no: "POL-991".into(),
        };
        assert_eq!(overdue.subject(), "OVERDUE: Car Insurance");
        assert_eq!(
            overdue.email_body(),
            "This item was due on 03/01/2025 and is overdue by 4 days.\nPolicy No: POL-991"
        );
        assert!(overdue.chat_text().starts_with("🚨 OVERDUE: Car Insurance\n"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn item_id_is_pure(name in ".{0,40}", due in ".{0,20}") {
                prop_assert_eq!(item_id(&name, &due), item_id(&name, &due));
            }

            #[test]
            fn item_id_has_no_spaces_from_name(name in "[a-zA-Z ]{1,40}") {
                let id = item_id(&name, "03/01/2025");
                let name_part = &id[..id.len() - "-03/01/2025".len()];
                prop_assert!(!name_part.contains(' '));
            }

            #[test]
            fn parse_advance_days_never_panics(raw in ".{0,60}") {
                let _ = parse_advance_days(&raw);
            }

            #[test]
            fn parsed_entries_round_trip(days in proptest::collection::vec(0i64..365, 0..8)) {
                let raw = days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",");
                prop_assert_eq!(parse_advance_days(&raw), days);
            }
        }
    }
}
