//! Assembly of all outputs of a piece.
//!
//! Voices are quantized once, then the event stream and the notation are
//! built independently from the same note lists.

use log::debug;

use super::FractalPiece;
use crate::{
    lilypond_render::{score_document, RenderSettings, RendersToLilypond, Staff},
    midi::{SequenceBuilder, TimedEventStream},
    notation::NotationRenderer,
    primitives::NoteList,
    quantize::piece_resolution,
    ScoreError, ScoreResult,
};

/// Rendered piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    events: TimedEventStream,
    notation: String,
    lilypond: String,
}
impl Output {
    pub fn events(&self) -> &TimedEventStream {
        &self.events
    }
    /// `{[ directives notes ],[ ... ]}`: Guido tags with LilyPond music.
    pub fn notation(&self) -> &str {
        &self.notation
    }
    /// Complete LilyPond document, one staff per voice.
    pub fn lilypond_score(&self) -> &str {
        &self.lilypond
    }
}

/// Render every voice of the piece.
///
/// # Example
///
/// ```
/// use fractal_score::{
///     assemble, primitives::parse_note_list, FractalPiece, RenderSettings,
///     Scale,
/// };
///
/// let scale = Scale::major("C".parse().unwrap()).unwrap();
/// let germ = parse_note_list("C4,1/4 D4,1/8 E4,1/8 C4,1/4", &scale).unwrap();
/// let piece = FractalPiece::new(germ.clone(), scale);
/// let settings = RenderSettings::new(false, false);
/// let output = assemble(&piece, &[germ], &settings).unwrap();
/// assert_eq!(
///     output.notation(),
///     r#"{[ \key<0> \meter<"4/4"> c'4 d'8 e'8 c'4 ]}"#
/// );
/// ```
pub fn assemble(
    piece: &FractalPiece,
    voices: &[NoteList],
    settings: &RenderSettings,
) -> ScoreResult<Output> {
    if piece.germ().is_empty() {
        return Err(ScoreError::GermIsEmpty);
    }
    let resolution = piece_resolution(piece, voices)?;
    let events = SequenceBuilder::new(piece, resolution).build(voices)?;
    let renderer = NotationRenderer::new(piece.scale());
    let mut notation = String::from("{");
    let mut staves = Vec::with_capacity(voices.len());
    for voice in voices {
        let music = renderer.render(voice)?;
        let instrument = voice.instrument().cloned().unwrap_or_default();
        let mut directives = Vec::new();
        if settings.include_instrument_marking {
            directives.push(instrument.to_guido());
        }
        directives.push(piece.scale().key_signature().to_guido());
        directives.push(piece.time_signature().to_guido());
        if settings.include_tempo_marking {
            directives.push(piece.tempo().to_guido());
        }
        if !music.is_empty() {
            directives.push(music.clone());
        }
        notation.push_str(&format!("[ {} ],", directives.join(" ")));
        staves.push(Staff {
            instrument_name: settings
                .include_instrument_marking
                .then(|| instrument.name().to_string()),
            directives: lilypond_directives(piece, settings)?,
            music,
        });
    }
    if notation.ends_with(',') {
        notation.pop();
    }
    notation.push('}');
    debug!("assembled {} voices", voices.len());
    Ok(Output {
        events,
        notation,
        lilypond: score_document(&staves),
    })
}

fn lilypond_directives(
    piece: &FractalPiece,
    settings: &RenderSettings,
) -> ScoreResult<Vec<String>> {
    let mut directives = vec![
        piece.scale().render_lilypond()?,
        piece.time_signature().render_lilypond()?,
    ];
    if settings.include_tempo_marking {
        directives.push(piece.tempo().render_lilypond()?);
    }
    Ok(directives)
}
