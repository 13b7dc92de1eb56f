use crate::core::meeting::{MeetingStatus, can_transition};

#[test]
fn lifecycle_happy_path_transitions_are_allowed() {
    let path = [
        (MeetingStatus::Pending, MeetingStatus::InProgress),
        (MeetingStatus::InProgress, MeetingStatus::Waiting),
        (MeetingStatus::Waiting, MeetingStatus::InProgress),
        (MeetingStatus::InProgress, MeetingStatus::Completed),
    ];
    for (from, to) in path {
        assert!(
            can_transition(from, to),
            "expected transition {:?} -> {:?} to be allowed",
            from,
            to
        );
    }
}

#[test]
fn staying_in_place_is_always_allowed() {
    for status in [
        MeetingStatus::Pending,
        MeetingStatus::InProgress,
        MeetingStatus::Waiting,
        MeetingStatus::Completed,
        MeetingStatus::Error,
    ] {
        assert!(can_transition(status, status));
    }
}

#[test]
fn terminal_states_accept_no_transitions() {
    for terminal in [MeetingStatus::Completed, MeetingStatus::Error] {
        assert!(terminal.is_terminal());
        for to in [
            MeetingStatus::Pending,
            MeetingStatus::InProgress,
            MeetingStatus::Waiting,
        ] {
            assert!(
                !can_transition(terminal, to),
                "expected {:?} -> {:?} to be rejected",
                terminal,
                to
            );
        }
    }
    assert!(!can_transition(MeetingStatus::Completed, MeetingStatus::Error));
}

#[test]
fn shortcuts_around_the_lifecycle_are_rejected() {
    assert!(!can_transition(
        MeetingStatus::Pending,
        MeetingStatus::Completed
    ));
    assert!(!can_transition(
        MeetingStatus::Pending,
        MeetingStatus::Waiting
    ));
    assert!(!can_transition(
        MeetingStatus::Waiting,
        MeetingStatus::Completed
    ));
}

#[test]
fn any_active_state_may_be_marked_as_error() {
    for from in [
        MeetingStatus::Pending,
        MeetingStatus::InProgress,
        MeetingStatus::Waiting,
    ] {
        assert!(can_transition(from, MeetingStatus::Error));
    }
}

#[test]
fn status_strings_round_trip() {
    for status in [
        MeetingStatus::Pending,
        MeetingStatus::InProgress,
        MeetingStatus::Waiting,
        MeetingStatus::Completed,
        MeetingStatus::Error,
    ] {
        assert_eq!(MeetingStatus::from_status(status.as_str()), Some(status));
    }
    assert_eq!(MeetingStatus::from_status("paused"), None);
}
