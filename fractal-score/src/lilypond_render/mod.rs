use serde::{Deserialize, Serialize};

use crate::{
    primitives::{NoteName, ResolvedPitch},
    ScoreResult,
};

/// Flags of the assembled output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub include_tempo_marking: bool,
    pub include_instrument_marking: bool,
}
impl RenderSettings {
    pub fn new(
        include_tempo_marking: bool,
        include_instrument_marking: bool,
    ) -> Self {
        Self {
            include_tempo_marking,
            include_instrument_marking,
        }
    }
}
impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            include_tempo_marking: true,
            include_instrument_marking: true,
        }
    }
}

pub trait RendersToLilypond {
    fn render_lilypond(&self) -> ScoreResult<String>;
}

/// Dutch note name: `c`, `cis`, `es`, `as`, `beses`.
impl RendersToLilypond for NoteName {
    fn render_lilypond(&self) -> ScoreResult<String> {
        let letter = self.letter.lilypond();
        let name = match self.accidental {
            x if x > 0 => format!("{letter}{}", "is".repeat(x as usize)),
            0 => letter.to_string(),
            x => {
                let flats = "es".repeat(x.unsigned_abs() as usize);
                match letter {
                    'a' | 'e' => format!("{letter}{}", &flats[1..]),
                    _ => format!("{letter}{flats}"),
                }
            }
        };
        Ok(name)
    }
}

/// Note name with absolute octave marks: octave 3 has none.
impl RendersToLilypond for ResolvedPitch {
    fn render_lilypond(&self) -> ScoreResult<String> {
        let marks = match self.octave - 3 {
            x if x > 0 => "'".repeat(x as usize),
            x => ",".repeat(x.unsigned_abs() as usize),
        };
        Ok(format!("{}{}", self.name().render_lilypond()?, marks))
    }
}

/// One staff of a score document.
#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    pub instrument_name: Option<String>,
    pub directives: Vec<String>,
    pub music: String,
}

/// Full LilyPond document, one staff per voice, in a single system.
pub fn score_document(staves: &[Staff]) -> String {
    let staves: Vec<String> = staves
        .iter()
        .map(|staff| {
            let with = match &staff.instrument_name {
                Some(name) => {
                    format!(r#" \with {{ instrumentName = "{name}" }}"#)
                }
                None => String::new(),
            };
            let mut body = staff.directives.clone();
            body.push(staff.music.clone());
            format!("    \\new Staff{with} {{ {} }}", body.join(" "))
        })
        .collect();
    format!(
        r###"\version "2.24"
\paper {{
    indent = 0\mm
    oddFooterMarkup = ##f
    oddHeaderMarkup = ##f
    bookTitleMarkup = ##f
    scoreTitleMarkup = ##f
}}
\score {{
  <<
{}
  >>
}}
"###,
        staves.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::{score_document, RenderSettings, RendersToLilypond, Staff};
    use crate::primitives::{Letter, NoteName, ResolvedPitch};

    fn name(letter: Letter, accidental: i32) -> String {
        NoteName::new(letter, accidental).render_lilypond().unwrap()
    }

    #[test]
    fn dutch_names() {
        assert_eq!(name(Letter::C, 0), "c");
        assert_eq!(name(Letter::C, 1), "cis");
        assert_eq!(name(Letter::F, 2), "fisis");
        assert_eq!(name(Letter::B, -1), "bes");
        assert_eq!(name(Letter::B, -2), "beses");
        assert_eq!(name(Letter::E, -1), "es");
        assert_eq!(name(Letter::A, -1), "as");
        assert_eq!(name(Letter::A, -2), "ases");
    }

    #[test]
    fn octave_marks() {
        let render = |letter, accidental, octave| {
            ResolvedPitch::new(letter, accidental, octave)
                .render_lilypond()
                .unwrap()
        };
        assert_eq!(render(Letter::C, 0, 4), "c'");
        assert_eq!(render(Letter::C, 0, 3), "c");
        assert_eq!(render(Letter::C, 0, 1), "c,,");
        assert_eq!(render(Letter::C, 1, 4), "cis'");
        assert_eq!(render(Letter::E, -1, 5), "es''");
    }

    #[test]
    fn document() {
        let doc = score_document(&[Staff {
            instrument_name: Some("Piano".to_string()),
            directives: vec![r"\time 3/4".to_string()],
            music: "c'4 d'4 e'4".to_string(),
        }]);
        assert!(doc.starts_with(r#"\version "2.24""#));
        assert!(doc.contains(
            r#"\new Staff \with { instrumentName = "Piano" } { \time 3/4 c'4 d'4 e'4 }"#
        ));
    }

    #[test]
    fn settings_default() {
        let settings = RenderSettings::default();
        assert!(settings.include_tempo_marking);
        assert!(settings.include_instrument_marking);
        assert_eq!(settings, RenderSettings::new(true, true));
    }
}
