use seatalk_frame::{Frame, MIN_FRAME_LEN};
use tracing::debug;

use crate::config::RegistryConfig;
use crate::descriptor::Descriptor;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{MessageError, Result};
use crate::kinds::BUILTIN;
use crate::message::Message;

/// Ordered set of message descriptors.
///
/// Decoding picks the descriptors whose command byte and length match the
/// frame, then runs their `matches` predicates in registration order. The
/// first one that accepts the frame decodes it.
///
/// A registry is read-only once built and can be shared between threads
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
    config: RegistryConfig,
}

impl Registry {
    /// All built-in message kinds with the default configuration.
    pub fn builtin() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// All built-in message kinds.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            descriptors: BUILTIN.to_vec(),
            config,
        }
    }

    /// No descriptors at all. Every frame decodes as unknown.
    pub fn empty(config: RegistryConfig) -> Self {
        Self {
            descriptors: Vec::new(),
            config,
        }
    }

    /// Append a descriptor. It is tried after every descriptor registered
    /// before it.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<()> {
        let max = self.config.max_expected_length;
        if !(MIN_FRAME_LEN..=max).contains(&descriptor.expected_length) {
            return Err(MessageError::DescriptorLength {
                name: descriptor.name,
                length: descriptor.expected_length,
                max,
            });
        }
        debug!(
            name = descriptor.name,
            command = descriptor.command_byte,
            length = descriptor.expected_length,
            "registered descriptor"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Classify and decode one frame.
    ///
    /// Returns [`MessageError::UnknownMessage`] when no descriptor has the
    /// frame's command byte and length, and [`MessageError::MalformedMessage`]
    /// when some do but none accepts it.
    pub fn decode(&self, frame: &Frame, diag: &dyn Diagnostics) -> Result<Message> {
        let mut candidates = self.candidates(frame).peekable();
        if candidates.peek().is_none() {
            return Err(MessageError::UnknownMessage {
                command: frame.command(),
                length: frame.len(),
            });
        }

        let malformed = MessageError::MalformedMessage {
            command: frame.command(),
            length: frame.len(),
        };

        if self.config.strict_length_nibble && !frame.is_length_consistent() {
            diag.match_failed(frame, &[]);
            return Err(malformed);
        }

        let mut tried = Vec::new();
        for descriptor in candidates {
            if (descriptor.matches)(frame) {
                return (descriptor.decode)(frame, diag);
            }
            tried.push(descriptor.name);
        }

        diag.match_failed(frame, &tried);
        Err(malformed)
    }

    /// [`decode`](Self::decode) with diagnostics sent to `tracing`.
    pub fn decode_frame(&self, frame: &Frame) -> Result<Message> {
        self.decode(frame, &TracingDiagnostics)
    }

    /// Encode a message with the first descriptor registered for its kind.
    pub fn encode(&self, message: &Message) -> Result<Frame> {
        let kind = message.kind();
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.kind == kind)
            .ok_or(MessageError::NotRegistered(kind))?;

        let frame = (descriptor.encode)(message)?;
        if frame.len() != descriptor.expected_length {
            return Err(MessageError::LengthMismatch {
                kind,
                expected: descriptor.expected_length,
                actual: frame.len(),
            });
        }
        Ok(frame)
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn candidates<'a>(&'a self, frame: &'a Frame) -> impl Iterator<Item = &'a Descriptor> + 'a {
        self.descriptors.iter().filter(move |d| d.is_candidate(frame))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::diagnostics::testing::RecordingDiagnostics;
    use crate::diagnostics::SilentDiagnostics;
    use crate::kinds::{
        ApparentWindAngle, ApparentWindSpeed, AutopilotCourse, AutopilotWindStatus,
        CourseComputerStatus, DeadbandMode, DeadbandSetting, HeadingAndRudder, Keystroke,
        LampIntensity, LampLevel, NavigationToWaypoint, SpeedThroughWater, TargetWaypointName,
    };
    use crate::message::MessageKind;
    use crate::units::{Angle, Speed};

    fn frame(bytes: &[u8]) -> Frame {
        Frame::try_from(bytes).unwrap()
    }

    #[test]
    fn known_frames_classify() {
        let registry = Registry::builtin();
        let cases: &[(&[u8], MessageKind)] = &[
            (&[0x95, 0x86, 0x26, 0x97, 0x02, 0x00, 0x00, 0x00, 0x08], MessageKind::AutopilotCourseAlt),
            (&[0x95, 0x86, 0x0E, 0x00, 0x10, 0x00, 0x00, 0x04, 0x08], MessageKind::AutopilotCourseAlt),
            (&[0x84, 0x06, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08], MessageKind::AutopilotCourse),
            (&[0x86, 0x11, 0x06, 0xF9], MessageKind::Keystroke),
            (&[0x86, 0x01, 0x02, 0xFD], MessageKind::Keystroke),
            (&[0x87, 0x00, 0x01], MessageKind::Deadband),
            (&[0x9C, 0x01, 0x12, 0x00], MessageKind::HeadingRudder),
            (&[0x10, 0x01, 0x00, 0x0A], MessageKind::WindAngle),
            (&[0x11, 0x01, 0x0C, 0x02], MessageKind::WindSpeed),
            (&[0x11, 0x00, 0x01], MessageKind::AutopilotWindStatus),
            (&[0x20, 0x01, 0x00, 0x64], MessageKind::SpeedThroughWater),
            (&[0x30, 0x00, 0x08], MessageKind::LampIntensity),
            (&[0x82, 0x05, 0x00, 0xFF, 0x70, 0x8F, 0x05, 0xFA], MessageKind::WaypointName),
            (&[0x83, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00], MessageKind::CourseComputer),
            (&[0x85, 0x06, 0x00, 0x00, 0xC0, 0x0D, 0x1F, 0x00, 0xE0], MessageKind::NavigateToWaypoint),
            (&[0x88, 0x03, 0x01, 0x05, 0x09, 0x01], MessageKind::Calibration),
        ];
        for (bytes, kind) in cases {
            let message = registry.decode(&frame(bytes), &SilentDiagnostics).unwrap();
            assert_eq!(message.kind(), *kind, "{bytes:02X?}");
        }
    }

    #[test]
    fn parse_and_back_is_byte_exact() {
        let registry = Registry::builtin();
        let frames: &[&[u8]] = &[
            &[0x95, 0x86, 0x26, 0x97, 0x02, 0x00, 0x00, 0x00, 0x08],
            &[0x95, 0x86, 0x0E, 0x00, 0x10, 0x00, 0x00, 0x04, 0x08],
            &[0x84, 0x06, 0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08],
            &[0x86, 0x11, 0x06, 0xF9],
            &[0x87, 0x00, 0x02],
            &[0x9C, 0x01, 0x12, 0x00],
            &[0x82, 0x05, 0xAA, 0x55, 0x27, 0xD8, 0xA1, 0x5E],
            &[0x85, 0x06, 0x00, 0x00, 0xC0, 0x0D, 0x17, 0x00, 0xE8],
            &[0x11, 0x01, 0x12, 0x04],
            &[0x20, 0x01, 0x00, 0x64],
            &[0x83, 0x07, 0x01, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00],
        ];
        for bytes in frames {
            let message = registry.decode(&frame(bytes), &SilentDiagnostics).unwrap();
            let back = registry.encode(&message).unwrap();
            assert_eq!(back.as_bytes(), *bytes, "{message:?}");
        }
    }

    #[test]
    fn speed_through_water_ten_knots() {
        let message = Registry::builtin()
            .decode(&frame(&[0x20, 0x01, 0x00, 0x64]), &SilentDiagnostics)
            .unwrap();
        let Message::SpeedThroughWater(s) = message else {
            panic!("wrong variant");
        };
        assert_eq!(s.speed(), Speed::from_knots(10.0));
        assert!(!s.is_forwarded());
    }

    #[test]
    fn wind_angle_five_degrees() {
        let message = Registry::builtin()
            .decode(&frame(&[0x10, 0x01, 0x00, 0x0A]), &SilentDiagnostics)
            .unwrap();
        assert_eq!(
            message,
            Message::WindAngle(ApparentWindAngle {
                angle: Angle::from_degrees(5.0)
            })
        );
    }

    #[test]
    fn lamp_level_and_malformed_level() {
        let registry = Registry::builtin();
        let diag = RecordingDiagnostics::default();

        let message = registry.decode(&frame(&[0x30, 0x01, 0x04]), &diag).unwrap();
        assert_eq!(
            message,
            Message::LampIntensity(LampIntensity {
                level: LampLevel::Level1
            })
        );

        let err = registry.decode(&frame(&[0x30, 0x01, 0x03]), &diag).unwrap_err();
        assert!(matches!(
            err,
            MessageError::MalformedMessage {
                command: 0x30,
                length: 3
            }
        ));
        assert!(err.is_recoverable());
        assert_eq!(
            diag.mismatches.borrow().as_slice(),
            &[(vec![0x30, 0x01, 0x03], vec!["lamp_intensity"])]
        );
    }

    #[test]
    fn unknown_command_or_length() {
        let registry = Registry::builtin();
        let diag = RecordingDiagnostics::default();

        let depth = frame(&[0x00, 0x02, 0x00, 0x10, 0x00]);
        assert!(matches!(
            registry.decode(&depth, &diag),
            Err(MessageError::UnknownMessage { command: 0x00, length: 5 })
        ));

        let short_keystroke = frame(&[0x86, 0x00, 0x02]);
        assert!(matches!(
            registry.decode(&short_keystroke, &diag),
            Err(MessageError::UnknownMessage { command: 0x86, length: 3 })
        ));
        assert!(diag.mismatches.borrow().is_empty());
    }

    #[test]
    fn broken_complement_falls_through_to_malformed() {
        let registry = Registry::builtin();
        for bytes in [
            &[0x86, 0x01, 0x02, 0xFC][..],
            &[0x82, 0x05, 0x00, 0xFF, 0x00, 0xFF, 0x01, 0xFF][..],
            &[0x85, 0x06, 0x00, 0x00, 0xC0, 0x0D, 0x17, 0x00, 0xE9][..],
        ] {
            assert!(matches!(
                registry.decode(&frame(bytes), &SilentDiagnostics),
                Err(MessageError::MalformedMessage { .. })
            ));
        }
    }

    #[test]
    fn builtin_command_and_length_pairs_are_unique() {
        let registry = Registry::builtin();
        let mut seen = HashSet::new();
        for d in registry.descriptors() {
            assert!(
                seen.insert((d.command_byte, d.expected_length)),
                "{} shares its command byte and length",
                d.name
            );
        }
    }

    #[test]
    fn wind_speed_and_wind_status_share_a_command_byte() {
        let registry = Registry::builtin();
        let speed = registry
            .decode(&frame(&[0x11, 0x01, 0x00, 0x05]), &SilentDiagnostics)
            .unwrap();
        let status = registry
            .decode(&frame(&[0x11, 0x00, 0x01]), &SilentDiagnostics)
            .unwrap();
        assert_eq!(speed.kind(), MessageKind::WindSpeed);
        assert_eq!(status.kind(), MessageKind::AutopilotWindStatus);
    }

    #[test]
    fn every_encodable_default_round_trips() {
        let registry = Registry::builtin();
        let messages: Vec<Message> = vec![
            HeadingAndRudder::default().into(),
            AutopilotCourse::default().into(),
            Message::AutopilotCourseAlt(AutopilotCourse::default()),
            ApparentWindAngle::default().into(),
            ApparentWindSpeed::default().into(),
            AutopilotWindStatus::default().into(),
            SpeedThroughWater::default().into(),
            LampIntensity::default().into(),
            TargetWaypointName::default().into(),
            CourseComputerStatus::default().into(),
            NavigationToWaypoint::default().into(),
            Keystroke::new(0x01, 0).unwrap().into(),
            DeadbandSetting::default().into(),
        ];
        for message in messages {
            let f = registry.encode(&message).unwrap();
            assert!(f.is_length_consistent(), "{message:?}");
            assert_eq!(
                registry.decode(&f, &SilentDiagnostics).unwrap(),
                message,
                "{f}"
            );
        }
    }

    // Two descriptors on a command byte no built-in kind uses, told apart by
    // their predicates only.
    fn first_half(frame: &Frame) -> bool {
        frame[2] < 0x80
    }

    fn second_half(_frame: &Frame) -> bool {
        true
    }

    fn decode_as_minimal(_frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
        Ok(DeadbandSetting {
            mode: DeadbandMode::Minimal,
        }
        .into())
    }

    fn decode_as_automatic(_frame: &Frame, _diag: &dyn Diagnostics) -> Result<Message> {
        Ok(DeadbandSetting {
            mode: DeadbandMode::Automatic,
        }
        .into())
    }

    fn never_encodes(message: &Message) -> Result<Frame> {
        Err(MessageError::UnsupportedEncode(message.kind()))
    }

    fn custom(name: &'static str, decode: crate::descriptor::DecodeFn, matches: crate::descriptor::MatchFn) -> Descriptor {
        Descriptor {
            kind: MessageKind::Deadband,
            name,
            command_byte: 0xA5,
            expected_length: 3,
            decode,
            encode: never_encodes,
            matches,
        }
    }

    #[test]
    fn custom_descriptors_dispatch_in_registration_order() {
        let mut registry = Registry::empty(RegistryConfig::default());
        registry.register(custom("low", decode_as_minimal, first_half)).unwrap();
        registry.register(custom("rest", decode_as_automatic, second_half)).unwrap();

        let low = registry.decode(&frame(&[0xA5, 0x00, 0x10]), &SilentDiagnostics).unwrap();
        let high = registry.decode(&frame(&[0xA5, 0x00, 0x90]), &SilentDiagnostics).unwrap();
        assert_eq!(low, Message::Deadband(DeadbandSetting { mode: DeadbandMode::Minimal }));
        assert_eq!(high, Message::Deadband(DeadbandSetting { mode: DeadbandMode::Automatic }));
    }

    #[test]
    fn register_rejects_impossible_lengths() {
        let mut registry = Registry::builtin();
        let mut too_long = custom("too_long", decode_as_minimal, second_half);
        too_long.expected_length = 19;
        assert!(matches!(
            registry.register(too_long),
            Err(MessageError::DescriptorLength { length: 19, max: 18, .. })
        ));

        let mut too_short = too_long;
        too_short.expected_length = 2;
        assert!(registry.register(too_short).is_err());
        assert_eq!(registry.descriptors().len(), BUILTIN.len());
    }

    #[test]
    fn encode_without_descriptor() {
        let registry = Registry::empty(RegistryConfig::default());
        let message: Message = DeadbandSetting::default().into();
        assert!(matches!(
            registry.encode(&message),
            Err(MessageError::NotRegistered(MessageKind::Deadband))
        ));
    }

    #[test]
    fn calibration_cannot_be_encoded() {
        let registry = Registry::builtin();
        let message = registry
            .decode(&frame(&[0x88, 0x03, 0x01, 0x05, 0x09, 0x01]), &SilentDiagnostics)
            .unwrap();
        assert!(matches!(
            registry.encode(&message),
            Err(MessageError::UnsupportedEncode(MessageKind::Calibration))
        ));
    }

    #[test]
    fn strict_mode_rejects_inconsistent_nibble() {
        let lenient = Registry::builtin();
        let strict = Registry::with_config(RegistryConfig {
            strict_length_nibble: true,
            ..RegistryConfig::default()
        });
        let f = frame(&[0x30, 0x01, 0x04]);

        assert!(lenient.decode(&f, &SilentDiagnostics).is_ok());
        assert!(matches!(
            strict.decode(&f, &SilentDiagnostics),
            Err(MessageError::MalformedMessage { .. })
        ));
        assert!(strict.decode(&frame(&[0x30, 0x00, 0x04]), &SilentDiagnostics).is_ok());
    }

    #[test]
    fn shared_across_threads() {
        let registry = Arc::new(Registry::builtin());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .decode(&frame(&[0x86, 0x01, 0x02, 0xFD]), &SilentDiagnostics)
                        .unwrap()
                        .kind()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), MessageKind::Keystroke);
        }
    }
}
