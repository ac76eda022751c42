//! Alarm playback capability.
//!
//! The state machine only emits [`AlarmAction`] descriptors; actual playback
//! goes through an injected [`AlarmSink`] so the core has no dependency on a
//! concrete audio backend and tests can substitute a recording fake.

use crate::drowsiness::AlarmAction;

/// Looping alarm playback service.
///
/// Both operations are idempotent: `start` is a no-op while playback is
/// already looping and `stop` is a no-op while idle. The state machine's
/// edge-triggering already guarantees at most one logical start between any
/// two stops, so implementations need no internal debouncing.
pub trait AlarmSink {
    /// Begin looping playback
    fn start(&mut self);

    /// Halt playback
    fn stop(&mut self);
}

/// Alarm sink that does nothing.
///
/// Used for visual-only operation and as the degraded mode when the sound
/// backend fails to initialize.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAlarm;

impl AlarmSink for NullAlarm {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

/// Apply an alarm action descriptor to a sink
pub fn apply<S: AlarmSink + ?Sized>(action: AlarmAction, sink: &mut S) {
    match action {
        AlarmAction::None => {}
        AlarmAction::Start => sink.start(),
        AlarmAction::Stop => sink.stop(),
    }
}

#[cfg(feature = "audio")]
pub mod audio {
    //! Alarm playback backed by `rodio`.

    use std::io::Cursor;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::AlarmSink;
    use crate::{Error, Result};

    /// Looping WAV playback on the default audio device.
    ///
    /// The sound file is read and validated once at construction; failures
    /// surface there so the caller can degrade to [`super::NullAlarm`].
    pub struct AudioAlarm {
        // Keep the stream alive for as long as playback may happen.
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sound_data: Vec<u8>,
        sink: Option<Sink>,
    }

    impl AudioAlarm {
        /// Open the default output device and load the alarm sound.
        ///
        /// # Errors
        ///
        /// Returns an error if no output device is available, the file
        /// cannot be read, or the sound data cannot be decoded.
        pub fn new<P: AsRef<Path>>(sound_path: P) -> Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| Error::AlarmError(format!("no output device: {e}")))?;

            let sound_data = std::fs::read(&sound_path)?;

            // Decode once up front so a bad asset is reported at startup,
            // not on the first alarm.
            Decoder::new(Cursor::new(sound_data.clone()))
                .map_err(|e| Error::AlarmError(format!("cannot decode alarm sound: {e}")))?;

            log::info!("Loaded alarm sound: {}", sound_path.as_ref().display());

            Ok(Self {
                _stream: stream,
                handle,
                sound_data,
                sink: None,
            })
        }

        fn is_playing(&self) -> bool {
            self.sink.as_ref().is_some_and(|s| !s.empty())
        }
    }

    impl AlarmSink for AudioAlarm {
        fn start(&mut self) {
            if self.is_playing() {
                return;
            }

            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::warn!("Failed to open audio sink: {e}");
                    return;
                }
            };

            match Decoder::new(Cursor::new(self.sound_data.clone())) {
                Ok(source) => {
                    sink.append(source.repeat_infinite());
                    self.sink = Some(sink);
                }
                Err(e) => log::warn!("Failed to decode alarm sound: {e}"),
            }
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_alarm_is_idempotent() {
        let mut alarm = NullAlarm;
        alarm.start();
        alarm.start();
        alarm.stop();
        alarm.stop();
    }

    #[test]
    fn test_apply_dispatch() {
        #[derive(Default)]
        struct Counting {
            starts: usize,
            stops: usize,
        }

        impl AlarmSink for Counting {
            fn start(&mut self) {
                self.starts += 1;
            }
            fn stop(&mut self) {
                self.stops += 1;
            }
        }

        let mut sink = Counting::default();
        apply(AlarmAction::None, &mut sink);
        apply(AlarmAction::Start, &mut sink);
        apply(AlarmAction::None, &mut sink);
        apply(AlarmAction::Stop, &mut sink);

        assert_eq!(sink.starts, 1);
        assert_eq!(sink.stops, 1);
    }
}
