//! Text and keyboards shown to actors.
//!
//! Everything here is a pure function of a [`LotSnapshot`] or a
//! [`RankedReport`].

use parkhub_core::traits::directory::ActorNames;
use parkhub_core::types::id::ActorId;
use parkhub_core::types::keyboard::{Button, Keyboard};
use parkhub_lot::{LotSnapshot, PlaceState};
use parkhub_stats::{RankedEntry, RankedReport};

use crate::action::Action;

/// Info text sent on `start`.
pub const WELCOME: &str = "Welcome to the *Parking bot*!\nPick a place with the buttons below";

/// Reply to `stop`.
pub const GOODBYE: &str =
    "You will no longer receive notifications. Send /start at any time to come back.";

const FREE_CAPTION: &str = "free";
const CANCEL_CAPTION: &str = "\u{21A9} Cancel reservation";
const CLEAR_CAPTION: &str = "\u{1F193} Clear parking";
const STATISTICS_CAPTION: &str = "\u{1F4CA} Statistics";

/// One sign per place, occupied places first and free places last.
pub fn status_text(snapshot: &LotSnapshot) -> String {
    let mut places: Vec<_> = snapshot.iter().collect();
    places.sort_by_key(|p| p.state.display_rank());
    places.iter().map(|p| p.sign()).collect()
}

/// Keyboard for `viewer`: a row per place, then the lot-wide actions.
pub fn keyboard(snapshot: &LotSnapshot, viewer: &ActorId, names: &ActorNames) -> Keyboard {
    let mut keyboard = Keyboard::new();

    for place in snapshot.iter() {
        let holder = match &place.occupant {
            Some(occupant) => names
                .get(occupant)
                .cloned()
                .unwrap_or_else(|| occupant.to_string()),
            None => FREE_CAPTION.to_string(),
        };
        let caption = format!("{} {} {}", place.sign(), place.id, holder);
        let mut row = vec![Button::new(
            caption,
            Action::Place(place.id.clone()).callback(),
        )];

        if place.state == PlaceState::Reserved && place.is_held_by(viewer) {
            row.push(Button::new(
                CANCEL_CAPTION,
                Action::Cancel(place.id.clone()).callback(),
            ));
        }
        keyboard.push_row(row);
    }

    let statistics = Button::new(STATISTICS_CAPTION, Action::Statistics.callback());
    if snapshot.is_free() {
        keyboard.push_row(vec![statistics]);
    } else {
        keyboard.push_row(vec![
            Button::new(CLEAR_CAPTION, Action::Clear.callback()),
            statistics,
        ]);
    }

    keyboard
}

/// The statistics message.
pub fn statistics_text(report: &RankedReport) -> String {
    let totals = format!(
        "\u{1F9EE} *Total count*: {}\n\u{23F1} *Total time*: {}",
        report.total_reservations, report.total_time
    );

    [
        "\u{1F4CA} *Statistics*".to_string(),
        totals,
        block("\u{1F17F} *Places*", &report.places),
        block("\u{1F464} *People*", &report.actors),
        block("\u{1F4C5} *Weekdays*", &report.weekdays),
        block("\u{1F5D3} *Months*", &report.months),
    ]
    .join("\n\n")
}

fn block(title: &str, entries: &[RankedEntry]) -> String {
    let mut text = title.to_string();
    for (n, entry) in entries.iter().enumerate() {
        text.push_str(&format!("\n{}. {} - {}", n + 1, entry.label, entry.count));
    }
    text
}

/// Action line broadcast after a successful transition by `name`.
pub fn action_line(name: &str, verb: &str, place: Option<&str>) -> String {
    match place {
        Some(place) => format!("*{name}* {verb} place *{place}*"),
        None => format!("*{name}* {verb}"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use parkhub_core::types::id::PlaceId;
    use parkhub_lot::PlaceSnapshot;

    use super::*;

    fn snapshot() -> LotSnapshot {
        LotSnapshot {
            places: vec![
                PlaceSnapshot::free(PlaceId::from("1")),
                PlaceSnapshot::reserved(PlaceId::from("2"), ActorId::from("a")),
                PlaceSnapshot::occupied(PlaceId::from("3"), ActorId::from("b"), Utc::now()),
            ],
        }
    }

    fn names() -> ActorNames {
        [(ActorId::from("a"), "Alice".to_string())]
            .into_iter()
            .collect()
    }

    fn captions(keyboard: &Keyboard) -> Vec<Vec<String>> {
        keyboard
            .rows
            .iter()
            .map(|row| row.iter().map(|b| b.caption.clone()).collect())
            .collect()
    }

    #[test]
    fn test_status_text_orders_by_state() {
        assert_eq!(status_text(&snapshot()), "\u{1F7E5}\u{1F7E8}\u{1F7E9}");
    }

    #[test]
    fn test_keyboard_for_reservation_holder() {
        let keyboard = keyboard(&snapshot(), &ActorId::from("a"), &names());
        assert_eq!(
            captions(&keyboard),
            vec![
                vec!["\u{1F7E9} 1 free".to_string()],
                vec![
                    "\u{1F7E8} 2 Alice".to_string(),
                    CANCEL_CAPTION.to_string()
                ],
                vec!["\u{1F7E5} 3 b".to_string()],
                vec![CLEAR_CAPTION.to_string(), STATISTICS_CAPTION.to_string()],
            ]
        );
        assert!(keyboard.find("cancel.2").is_some());
    }

    #[test]
    fn test_keyboard_for_other_viewer() {
        let keyboard = keyboard(&snapshot(), &ActorId::from("b"), &names());
        assert!(keyboard.find("cancel.2").is_none());
        assert_eq!(keyboard.rows.len(), 4);
    }

    #[test]
    fn test_free_lot_has_no_clear_button() {
        let free = LotSnapshot {
            places: vec![PlaceSnapshot::free(PlaceId::from("1"))],
        };
        let keyboard = keyboard(&free, &ActorId::from("a"), &ActorNames::new());
        assert_eq!(keyboard.rows.last().map(Vec::len), Some(1));
        assert!(keyboard.find("clear").is_none());
        assert!(keyboard.find("statistics").is_some());
    }

    #[test]
    fn test_statistics_text_blocks() {
        let entry = |label: &str, count| RankedEntry {
            key: label.to_string(),
            label: label.to_string(),
            count,
        };
        let report = RankedReport {
            places: vec![entry("2", 3), entry("1", 1)],
            actors: vec![entry("Alice", 4)],
            weekdays: vec![],
            months: vec![entry("March", 4)],
            total_reservations: 4,
            total_occupied_seconds: 3660.0,
            total_time: "1:01".to_string(),
        };

        let text = statistics_text(&report);
        assert!(text.contains("*Total count*: 4"));
        assert!(text.contains("*Total time*: 1:01"));
        assert!(text.contains("*Places*\n1. 2 - 3\n2. 1 - 1"));
        assert!(text.contains("*People*\n1. Alice - 4"));
        assert!(text.contains("*Weekdays*\n\n"));
    }

    #[test]
    fn test_action_line() {
        assert_eq!(
            action_line("Alice", "reserved", Some("1")),
            "*Alice* reserved place *1*"
        );
        assert_eq!(
            action_line("Alice", "cleared the parking", None),
            "*Alice* cleared the parking"
        );
    }
}
