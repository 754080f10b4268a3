// src/format.rs
//
// Human-readable rendering of received frames, plus the demonstration
// transmit fixture.

use crate::driver::{netid, CanTransmitFrame, ReceivedMessage};

/// Render one received message as a display line.
///
/// CAN frames render as `0x<arbid> [<len>] <bytes> (<timestamp>)` with
/// lowercase hex. Frames on other networks render as a netid/length summary.
/// Non-CAN frames with netid 0 are suppressed entirely (`None`) — these are
/// "no network" placeholder entries from the driver's buffer.
pub fn format_message(msg: &ReceivedMessage) -> Option<String> {
    match msg {
        ReceivedMessage::Can(frame) => {
            let mut line = format!("0x{:03x} [{}] ", frame.arbid, frame.data.len());
            for byte in &frame.data {
                line.push_str(&format!("{:02x} ", byte));
            }
            line.push_str(&format!("({})", frame.timestamp));
            Some(line)
        }
        ReceivedMessage::Frame(frame) => {
            if frame.netid == netid::NONE {
                return None;
            }
            Some(format!(
                "Message on netid {} with length {}",
                frame.netid, frame.length
            ))
        }
    }
}

/// Fixed demonstration frame for the "Send message" command: arbitration id
/// `0x120`, six bytes `aa bb cc dd ee ff` on HS CAN, classic CAN (extended
/// and FD flags cleared). Gives the operator a one-keystroke way to exercise
/// transmit without manual frame entry.
pub fn sample_frame() -> CanTransmitFrame {
    CanTransmitFrame {
        netid: netid::HSCAN,
        arbid: 0x120,
        data: vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
        is_extended: false,
        is_fd: false,
        is_brs: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CanRxFrame, RawFrame};

    #[test]
    fn test_format_can_frame() {
        let msg = ReceivedMessage::Can(CanRxFrame {
            netid: netid::HSCAN,
            arbid: 0x120,
            data: vec![0xaa, 0xbb, 0xcc],
            timestamp: 42,
            extended: false,
            fd: false,
        });
        assert_eq!(
            format_message(&msg).expect("CAN frame should render"),
            "0x120 [3] aa bb cc (42)"
        );
    }

    #[test]
    fn test_format_can_frame_empty_payload() {
        let msg = ReceivedMessage::Can(CanRxFrame {
            netid: netid::HSCAN,
            arbid: 0x7ff,
            data: vec![],
            timestamp: 1,
            extended: false,
            fd: false,
        });
        assert_eq!(
            format_message(&msg).expect("CAN frame should render"),
            "0x7ff [0] (1)"
        );
    }

    #[test]
    fn test_format_short_arbid_pads_to_three_digits() {
        let msg = ReceivedMessage::Can(CanRxFrame {
            netid: netid::HSCAN,
            arbid: 0x5,
            data: vec![0x01],
            timestamp: 9,
            extended: false,
            fd: false,
        });
        assert_eq!(
            format_message(&msg).expect("CAN frame should render"),
            "0x005 [1] 01 (9)"
        );
    }

    #[test]
    fn test_format_non_can_frame() {
        let msg = ReceivedMessage::Frame(RawFrame {
            netid: 5,
            length: 4,
            timestamp: 100,
        });
        assert_eq!(
            format_message(&msg).expect("non-CAN frame should render"),
            "Message on netid 5 with length 4"
        );
    }

    #[test]
    fn test_netid_zero_suppressed() {
        let msg = ReceivedMessage::Frame(RawFrame {
            netid: netid::NONE,
            length: 12,
            timestamp: 100,
        });
        assert!(format_message(&msg).is_none());
    }

    #[test]
    fn test_sample_frame_fixture() {
        let frame = sample_frame();
        assert_eq!(frame.arbid, 0x120);
        assert_eq!(frame.netid, netid::HSCAN);
        assert_eq!(frame.data, vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert!(!frame.is_extended);
        assert!(!frame.is_fd);
        assert!(!frame.is_brs);
    }
}
