//! Tick-accurate event stream of a piece.
//!
//! Track 0 holds meta events (key, time signature, tempo). Every voice
//! gets its own track and the channel equal to its index. Ticks are
//! counted per whole note with the [`Resolution`] of the stream; the
//! conversion into a Standard MIDI File lives in [`export`].

pub mod export;

use log::{debug, trace, warn};

use crate::{
    dom::FractalPiece,
    primitives::{
        AbsolutePosition, Instrument, Note, NoteList, ResolvedPitch, Tempo,
        TimeSignature,
    },
    quantize::Resolution,
    scale::{KeySignature, Scale},
    ScoreError, ScoreResult,
};

/// Maximum count of voices: one per MIDI channel.
pub static MAX_VOICES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8 },
    ProgramChange { channel: u8, program: u8 },
    KeySignature(KeySignature),
    TimeSignature(TimeSignature),
    Tempo(Tempo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub event: MidiEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventTrack {
    events: Vec<TimedEvent>,
}
impl EventTrack {
    pub fn push(&mut self, tick: u64, event: MidiEvent) {
        self.events.push(TimedEvent { tick, event })
    }
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }
    pub fn len(&self) -> usize {
        self.events.len()
    }
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
    /// Stable: events of the same tick keep their order.
    pub fn sort_by_tick(&mut self) {
        self.events.sort_by_key(|event| event.tick)
    }
    /// `(tick, key)` of every note-on.
    pub fn note_ons(&self) -> Vec<(u64, u8)> {
        self.events
            .iter()
            .filter_map(|event| match event.event {
                MidiEvent::NoteOn { key, .. } => Some((event.tick, key)),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEventStream {
    resolution: Resolution,
    tracks: Vec<EventTrack>,
}
impl TimedEventStream {
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
    /// Meta track first, then one track per voice.
    pub fn tracks(&self) -> &[EventTrack] {
        &self.tracks
    }
    pub fn meta_track(&self) -> Option<&EventTrack> {
        self.tracks.first()
    }
    pub fn voice_tracks(&self) -> &[EventTrack] {
        self.tracks.get(1..).unwrap_or_default()
    }
}

/// Note with its place in time and resolved pitch.
#[derive(Debug)]
struct PlacedNote<'n> {
    note: &'n Note,
    start: AbsolutePosition,
    pitch: ResolvedPitch,
    diatonic: bool,
}

/// Which note of a colliding pair lost its chromatic adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Respelled {
    Nothing,
    Previous,
    Current,
}

/// Builds the event stream of a piece at a fixed resolution.
#[derive(Debug)]
pub struct SequenceBuilder<'a> {
    piece: &'a FractalPiece,
    resolution: Resolution,
}
impl<'a> SequenceBuilder<'a> {
    pub fn new(piece: &'a FractalPiece, resolution: Resolution) -> Self {
        Self { piece, resolution }
    }

    fn scale(&self) -> &Scale {
        self.piece.scale()
    }

    pub fn build(&self, voices: &[NoteList]) -> ScoreResult<TimedEventStream> {
        if voices.len() > MAX_VOICES {
            return Err(ScoreError::TooManyVoices(voices.len()));
        }
        let mut tracks = vec![self.meta_track()?];
        for (channel, voice) in voices.iter().enumerate() {
            tracks.push(self.voice_track(voice, channel as u8)?);
        }
        debug!(
            "built {} tracks at resolution {}",
            tracks.len(),
            self.resolution.ticks_per_whole_note()
        );
        Ok(TimedEventStream {
            resolution: self.resolution,
            tracks,
        })
    }

    /// Initial key, key changes of sections, time signature and tempo.
    pub fn meta_track(&self) -> ScoreResult<EventTrack> {
        let mut track = EventTrack::default();
        let initial = self.scale().key_signature();
        track.push(0, MidiEvent::KeySignature(initial));
        let mut previous = initial;
        let mut start = AbsolutePosition::default();
        for section in self.piece.sections() {
            if section.key_signature() != previous {
                let tick = start.ticks(&self.resolution)?;
                trace!("key change at tick {}: {:?}", tick, section);
                track.push(tick, MidiEvent::KeySignature(section.key_signature()));
            }
            previous = section.key_signature();
            start += section.duration();
        }
        track.push(0, MidiEvent::TimeSignature(self.piece.time_signature()));
        track.push(0, MidiEvent::Tempo(self.piece.tempo()));
        track.sort_by_tick();
        Ok(track)
    }

    /// Program change, then note-on and note-off pair of every note.
    pub fn voice_track(
        &self,
        voice: &NoteList,
        channel: u8,
    ) -> ScoreResult<EventTrack> {
        let mut track = EventTrack::default();
        let program = voice
            .instrument()
            .map_or_else(|| Instrument::default().program(), Instrument::program);
        track.push(0, MidiEvent::ProgramChange { channel, program });
        let notes = voice.with_normalized_rests();
        let mut start = AbsolutePosition::default();
        let mut run: Vec<PlacedNote> = Vec::new();
        for note in notes.iter() {
            match note.is_rest() {
                true => self.flush_run(&mut track, channel, &mut run)?,
                false => run.push(PlacedNote {
                    note,
                    start,
                    pitch: self.resolve(note),
                    diatonic: note.chromatic_adjustment() == 0,
                }),
            }
            start += note.duration();
        }
        self.flush_run(&mut track, channel, &mut run)?;
        debug!("voice {}: {} events", channel, track.len());
        Ok(track)
    }

    fn resolve(&self, note: &Note) -> ResolvedPitch {
        self.scale().resolve_pitch(
            note.scale_step(),
            note.chromatic_adjustment(),
            note.octave(),
        )
    }

    /// Notes between two rests, with collisions separated, become events.
    fn flush_run(
        &self,
        track: &mut EventTrack,
        channel: u8,
        run: &mut Vec<PlacedNote>,
    ) -> ScoreResult<()> {
        self.separate_collisions(run)?;
        for placed in run.drain(..) {
            self.emit(track, channel, &placed)?;
        }
        Ok(())
    }

    /// Walks the run until no two adjacent notes collide.
    ///
    /// Respelling the previous note of a pair can make it collide with the
    /// note before it, so that pair is checked again. Every note is
    /// respelled at most once, so the walk ends.
    fn separate_collisions(&self, run: &mut [PlacedNote]) -> ScoreResult<()> {
        let mut idx = 1;
        while idx < run.len() {
            let (before, after) = run.split_at_mut(idx);
            match self.separate_collision(&mut before[idx - 1], &mut after[0])? {
                Respelled::Previous if idx > 1 => idx -= 1,
                _ => idx += 1,
            }
        }
        Ok(())
    }

    /// Adjacent notes, sounding the same but written at different scale
    /// positions, can not both keep their spelling: one of them falls back
    /// to its diatonic tone.
    fn separate_collision(
        &self,
        last: &mut PlacedNote,
        current: &mut PlacedNote,
    ) -> ScoreResult<Respelled> {
        if last.pitch.midi_pitch != current.pitch.midi_pitch {
            return Ok(Respelled::Nothing);
        }
        let scale = self.scale();
        if last.note.normalized_position(scale)
            == current.note.normalized_position(scale)
        {
            return Ok(Respelled::Nothing);
        }
        if !last.diatonic {
            self.respell(last);
            warn!("pitch collision: previous note respelled to {}", last.pitch);
            Ok(Respelled::Previous)
        } else if !current.diatonic {
            self.respell(current);
            warn!("pitch collision: note respelled to {}", current.pitch);
            Ok(Respelled::Current)
        } else {
            Err(ScoreError::InternalConsistency(format!(
                "notes {:?} and {:?} collide without chromatic adjustment",
                last.note, current.note
            )))
        }
    }

    fn respell(&self, placed: &mut PlacedNote) {
        placed.pitch = self.resolve(&placed.note.without_adjustment());
        placed.diatonic = true;
    }

    fn emit(
        &self,
        track: &mut EventTrack,
        channel: u8,
        placed: &PlacedNote,
    ) -> ScoreResult<()> {
        let key = placed.pitch.midi_key()?;
        let on = placed.start.ticks(&self.resolution)?;
        let length = self.resolution.ticks(placed.note.duration())?;
        trace!("channel {}: key {} at {} for {}", channel, key, on, length);
        track.push(
            on,
            MidiEvent::NoteOn {
                channel,
                key,
                velocity: placed.note.volume(),
            },
        );
        track.push(on + length, MidiEvent::NoteOff { channel, key });
        Ok(())
    }
}
