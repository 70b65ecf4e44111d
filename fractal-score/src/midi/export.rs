//! Standard MIDI File export of a [`TimedEventStream`].
//!
//! Format 1: the meta track and one track per voice. Internal ticks are
//! per whole note, MIDI ticks are per quarter, so the resolution becomes
//! PPQ as is and every tick is multiplied by four.

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Track, TrackEvent,
    TrackEventKind, Timing,
};

use super::{EventTrack, MidiEvent, TimedEventStream};
use crate::{ScoreError, ScoreResult};

/// MIDI ticks per internal tick.
pub static QUARTERS_PER_WHOLE_NOTE: u64 = 4;

impl TimedEventStream {
    pub fn to_smf(&self) -> ScoreResult<Smf<'static>> {
        let ppq = u16::try_from(self.resolution.ticks_per_whole_note())
            .ok()
            .and_then(u15::try_from)
            .ok_or_else(|| {
                ScoreError::InternalConsistency(format!(
                    "resolution {} does not fit MIDI file header",
                    self.resolution.ticks_per_whole_note()
                ))
            })?;
        let mut smf =
            Smf::new(Header::new(Format::Parallel, Timing::Metrical(ppq)));
        for track in self.tracks.iter() {
            smf.tracks.push(midly_track(track)?);
        }
        Ok(smf)
    }

    /// Bytes of the Standard MIDI File.
    pub fn write_smf(&self) -> ScoreResult<Vec<u8>> {
        let mut out = Vec::new();
        self.to_smf()?.write(&mut out).map_err(|e| {
            ScoreError::InternalConsistency(format!(
                "Failed to write MIDI: {}",
                e
            ))
        })?;
        Ok(out)
    }
}

fn midly_track(track: &EventTrack) -> ScoreResult<Track<'static>> {
    let mut events = Vec::with_capacity(track.len() + 1);
    let mut last_tick = 0;
    for event in track.events() {
        let delta = event.tick.checked_sub(last_tick).ok_or_else(|| {
            ScoreError::InternalConsistency(format!(
                "events are not sorted at tick {}",
                event.tick
            ))
        })?;
        last_tick = event.tick;
        events.push(TrackEvent {
            delta: delta_ticks(delta)?,
            kind: event_kind(&event.event)?,
        });
    }
    events.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    Ok(events)
}

fn delta_ticks(delta: u64) -> ScoreResult<u28> {
    delta
        .checked_mul(QUARTERS_PER_WHOLE_NOTE)
        .and_then(|ticks| u32::try_from(ticks).ok())
        .and_then(u28::try_from)
        .ok_or_else(|| {
            ScoreError::InternalConsistency(format!(
                "delta of {} ticks overflows MIDI",
                delta
            ))
        })
}

fn event_kind(event: &MidiEvent) -> ScoreResult<TrackEventKind<'static>> {
    let kind = match *event {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } => TrackEventKind::Midi {
            channel: channel_number(channel)?,
            message: MidiMessage::NoteOn {
                key: data_byte(key)?,
                vel: data_byte(velocity)?,
            },
        },
        MidiEvent::NoteOff { channel, key } => TrackEventKind::Midi {
            channel: channel_number(channel)?,
            message: MidiMessage::NoteOff {
                key: data_byte(key)?,
                vel: u7::new(0),
            },
        },
        MidiEvent::ProgramChange { channel, program } => {
            TrackEventKind::Midi {
                channel: channel_number(channel)?,
                message: MidiMessage::ProgramChange {
                    program: data_byte(program)?,
                },
            }
        }
        MidiEvent::KeySignature(key) => {
            TrackEventKind::Meta(MetaMessage::KeySignature(
                key.sharps_or_flats() as i8,
                key.tonality() == crate::scale::Tonality::Minor,
            ))
        }
        MidiEvent::TimeSignature(ts) => {
            TrackEventKind::Meta(MetaMessage::TimeSignature(
                ts.numerator(),
                ts.denominator().trailing_zeros() as u8,
                24, // MIDI clocks per metronome click
                8,  // 32nd notes per quarter note
            ))
        }
        MidiEvent::Tempo(tempo) => {
            let micros = u24::try_from(tempo.micros_per_quarter())
                .ok_or_else(|| {
                    ScoreError::InternalConsistency(format!(
                        "tempo {:?} overflows MIDI",
                        tempo
                    ))
                })?;
            TrackEventKind::Meta(MetaMessage::Tempo(micros))
        }
    };
    Ok(kind)
}

fn channel_number(channel: u8) -> ScoreResult<u4> {
    u4::try_from(channel).ok_or_else(|| {
        ScoreError::TooManyVoices(channel as usize + 1)
    })
}

fn data_byte(value: u8) -> ScoreResult<u7> {
    u7::try_from(value).ok_or_else(|| {
        ScoreError::InternalConsistency(format!(
            "{} does not fit MIDI data byte",
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

    use crate::{
        dom::FractalPiece,
        midi::SequenceBuilder,
        quantize::Resolution,
        Note, NoteList, Rational, Scale, ScoreError,
    };

    fn piece() -> FractalPiece {
        let scale = Scale::minor("D".parse().unwrap()).unwrap();
        let germ: NoteList =
            vec![Note::new(0, 0, 4, Rational::new(1, 4), 80).unwrap()].into();
        FractalPiece::new(germ, scale)
    }

    #[test]
    fn written_file_parses_back() {
        let piece = piece();
        let voice: NoteList = vec![
            Note::new(0, 0, 4, Rational::new(1, 4), 80).unwrap(),
            Note::new(2, 0, 4, Rational::new(1, 8), 90).unwrap(),
        ]
        .into();
        let stream = SequenceBuilder::new(&piece, Resolution::new(8))
            .build(&[voice])
            .unwrap();
        let bytes = stream.write_smf().unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        assert!(matches!(
            smf.header.timing,
            Timing::Metrical(ppq) if ppq.as_int() == 8
        ));
        assert!(smf.tracks[0].iter().any(|event| matches!(
            event.kind,
            TrackEventKind::Meta(MetaMessage::KeySignature(-1, true))
        )));
        let note_ons: Vec<_> = smf.tracks[1]
            .iter()
            .scan(0u32, |tick, event| {
                *tick += event.delta.as_int();
                Some((*tick, event.kind))
            })
            .filter_map(|(tick, kind)| match kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, .. },
                    ..
                } => Some((tick, key.as_int())),
                _ => None,
            })
            .collect();
        // D4 for a quarter, F4 after it: 2 internal ticks, 8 MIDI ticks.
        assert_eq!(note_ons, vec![(0, 62), (8, 65)]);
    }

    #[test]
    fn resolution_too_large() {
        let piece = piece();
        let stream = SequenceBuilder::new(&piece, Resolution::new(40_000))
            .build(&[])
            .unwrap();
        assert!(matches!(
            stream.to_smf(),
            Err(ScoreError::InternalConsistency(_))
        ));
    }
}
