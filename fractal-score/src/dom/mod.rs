//! Piece description: what is rendered, and in which key, meter and tempo.

pub mod output;

use crate::{
    primitives::{NoteList, Rational, Tempo, TimeSignature},
    scale::{KeySignature, Scale},
};

/// Part of the piece with its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    duration: Rational,
    key_signature: KeySignature,
}
impl Section {
    pub fn new(duration: Rational, key_signature: KeySignature) -> Self {
        Self {
            duration,
            key_signature,
        }
    }
    /// Length of the section in whole notes.
    pub fn duration(&self) -> Rational {
        self.duration
    }
    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }
}

/// Everything the renderers need to know about a piece besides its voices.
///
/// The germ is the seed, that the generation stage expands into voices.
/// Rendering refuses to start with an empty germ.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalPiece {
    germ: NoteList,
    scale: Scale,
    time_signature: TimeSignature,
    tempo: Tempo,
    sections: Vec<Section>,
}
impl FractalPiece {
    /// Piece in 4/4 with the default tempo and no sections.
    pub fn new(germ: NoteList, scale: Scale) -> Self {
        Self {
            germ,
            scale,
            time_signature: TimeSignature::default(),
            tempo: Tempo::default(),
            sections: Vec::new(),
        }
    }
    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = time_signature;
        self
    }
    pub fn with_tempo(mut self, tempo: Tempo) -> Self {
        self.tempo = tempo;
        self
    }
    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn germ(&self) -> &NoteList {
        &self.germ
    }
    pub fn scale(&self) -> &Scale {
        &self.scale
    }
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}
