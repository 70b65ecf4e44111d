use itertools::Itertools;
use log::trace;

use super::{NotationElement, NotationNote, Tuplet};
use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{is_power_of_two, Rational},
    ScoreResult,
};

/// Ordered notation elements of a voice or of a tuplet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotationElementList {
    elements: Vec<NotationElement>,
}
impl NotationElementList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, element: NotationElement) {
        self.elements.push(element)
    }
    pub fn get(&self, idx: usize) -> Option<&NotationElement> {
        self.elements.get(idx)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, NotationElement> {
        self.elements.iter()
    }
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Sum of element durations: written for notes, sounding for tuplets.
    pub fn duration(&self) -> Rational {
        self.elements.iter().map(NotationElement::duration).sum()
    }

    /// Index of the last element of the tuplet, that starts at `first`.
    ///
    /// Durations are summed from `first` until the sum has a power-of-two
    /// denominator. None if it never happens.
    pub fn end_index_for_tuplet_group(&self, first: usize) -> Option<usize> {
        end_index_for_tuplet_group(&self.elements, first)
    }

    /// Smallest denominator of element durations.
    pub fn smallest_duration_denominator(&self) -> Option<u64> {
        self.elements.iter().map(|el| el.duration().denom()).min()
    }

    /// Smallest denominator, that is not a power of two.
    pub fn smallest_irregular_denominator(&self) -> Option<u64> {
        self.elements
            .iter()
            .map(|el| el.duration().denom())
            .filter(|&denom| !is_power_of_two(denom))
            .min()
    }

    /// Largest power-of-two denominator of written durations.
    ///
    /// Looks inside tuplets, so it is the shortest glyph to be engraved.
    pub fn largest_duration_denominator(&self) -> Option<u64> {
        self.elements
            .iter()
            .filter_map(|el| match el {
                NotationElement::Note(note) => {
                    Some(note.duration().denom())
                        .filter(|&denom| is_power_of_two(denom))
                }
                NotationElement::Tuplet(tuplet) => {
                    tuplet.elements().largest_duration_denominator()
                }
            })
            .max()
    }

    pub fn total_duration_denom_adds_to_power_of_2(&self) -> bool {
        self.duration().denom_is_power_of_2()
    }

    /// Drop every maximal run of elements, that do not have the smallest
    /// irregular denominator, but sum to a power-of-two denominator.
    ///
    /// What is left decides the tuplet multiplier.
    pub fn remove_consecutive_notes_whose_denoms_add_to_power_of_2(
        &mut self,
    ) {
        let Some(base) = self.smallest_irregular_denominator() else {
            return;
        };
        let mut kept = Vec::with_capacity(self.elements.len());
        let mut run: Vec<NotationElement> = Vec::new();
        for element in self.elements.drain(..) {
            if element.duration().denom() != base {
                run.push(element);
                continue;
            }
            flush_run(&mut run, &mut kept);
            kept.push(element);
        }
        flush_run(&mut run, &mut kept);
        self.elements = kept;
    }

    /// Replace runs of irregular notes with (nested) tuplets.
    ///
    /// A note with a non-power-of-two denominator starts a run, that ends
    /// where the sum gets a power-of-two denominator. A note, that never
    /// reaches such a boundary, stays single.
    pub fn group_tuplets(&mut self) -> ScoreResult<()> {
        let elements = std::mem::take(&mut self.elements);
        let mut grouped = Vec::with_capacity(elements.len());
        let mut idx = 0;
        while idx < elements.len() {
            let element = &elements[idx];
            let starts_run = matches!(element, NotationElement::Note(_))
                && !element.duration().denom_is_power_of_2();
            if starts_run {
                if let Some(end) = end_index_for_tuplet_group(&elements, idx) {
                    trace!("tuplet group {}..={}", idx, end);
                    let run: NotationElementList =
                        elements[idx..=end].iter().cloned().collect();
                    grouped.push(NotationElement::Tuplet(Tuplet::new(run)?));
                    idx = end + 1;
                    continue;
                }
            }
            grouped.push(element.clone());
            idx += 1;
        }
        self.elements = grouped;
        Ok(())
    }

    /// All notes, with tuplets flattened.
    pub fn notation_notes(&self) -> Vec<&NotationNote> {
        self.elements
            .iter()
            .flat_map(|el| match el {
                NotationElement::Note(note) => vec![note],
                NotationElement::Tuplet(tuplet) => {
                    tuplet.elements().notation_notes()
                }
            })
            .collect()
    }
}

fn end_index_for_tuplet_group(
    elements: &[NotationElement],
    first: usize,
) -> Option<usize> {
    let mut sum = Rational::zero();
    elements
        .iter()
        .enumerate()
        .skip(first)
        .find(|(_, element)| {
            sum += element.duration();
            sum.denom_is_power_of_2()
        })
        .map(|(idx, _)| idx)
}

fn flush_run(run: &mut Vec<NotationElement>, kept: &mut Vec<NotationElement>) {
    if run.is_empty() {
        return;
    }
    let sum: Rational = run.iter().map(NotationElement::duration).sum();
    match sum.denom_is_power_of_2() {
        true => run.clear(),
        false => kept.append(run),
    }
}

impl From<Vec<NotationElement>> for NotationElementList {
    fn from(elements: Vec<NotationElement>) -> Self {
        Self { elements }
    }
}
impl FromIterator<NotationElement> for NotationElementList {
    fn from_iter<T: IntoIterator<Item = NotationElement>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
impl<'a> IntoIterator for &'a NotationElementList {
    type Item = &'a NotationElement;
    type IntoIter = std::slice::Iter<'a, NotationElement>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
impl RendersToLilypond for NotationElementList {
    fn render_lilypond(&self) -> ScoreResult<String> {
        Ok(self
            .elements
            .iter()
            .map(|el| el.render_lilypond())
            .collect::<ScoreResult<Vec<_>>>()?
            .into_iter()
            .join(" "))
    }
}
