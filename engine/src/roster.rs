//! The ordered list of faces a roll must show.

use crate::{
    constants::{MAX_DICE, MIN_DICE},
    error::RollError,
    face::Face,
};

/// Target faces in slot order (left to right). Always holds `MIN_DICE..=MAX_DICE` entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetRoster {
    faces: Vec<Face>,
}

impl TargetRoster {
    /// Validate raw values. Rejects out-of-range faces and sizes.
    pub fn from_values(values: &[u8]) -> Result<Self, RollError> {
        check_len(values.len())?;
        let faces = values
            .iter()
            .map(|&v| Face::try_from(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { faces })
    }

    /// Build from restored values, dropping extras past `MAX_DICE` and clamping each face
    /// into `1..=6`. An empty input gives the default roster.
    pub fn from_values_clamped(values: &[u8]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let faces = values
            .iter()
            .take(MAX_DICE)
            .map(|&v| Face::try_from(v.clamp(1, 6)).unwrap_or(Face::One))
            .collect();
        Self { faces }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn values(&self) -> Vec<u8> {
        self.faces.iter().map(|f| f.value()).collect()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Face> {
        self.faces.get(index).copied()
    }

    /// Append a slot showing `face`.
    pub fn push(&mut self, face: Face) -> Result<(), RollError> {
        check_len(self.faces.len() + 1)?;
        self.faces.push(face);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Face, RollError> {
        self.check_index(index)?;
        check_len(self.faces.len() - 1)?;
        Ok(self.faces.remove(index))
    }

    pub fn set(&mut self, index: usize, value: u8) -> Result<(), RollError> {
        self.check_index(index)?;
        let face = Face::try_from(value)?;
        self.faces[index] = face;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RollError> {
        if index < self.faces.len() {
            Ok(())
        } else {
            Err(RollError::NoSuchSlot {
                index,
                len: self.faces.len(),
            })
        }
    }
}

impl Default for TargetRoster {
    /// Six dice, all showing six.
    fn default() -> Self {
        Self {
            faces: vec![Face::Six; MAX_DICE],
        }
    }
}

impl TryFrom<&[u8]> for TargetRoster {
    type Error = RollError;

    fn try_from(values: &[u8]) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

fn check_len(len: usize) -> Result<(), RollError> {
    if (MIN_DICE..=MAX_DICE).contains(&len) {
        Ok(())
    } else {
        Err(RollError::RosterSize(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_six_sixes() {
        assert_eq!(TargetRoster::default().values(), vec![6; 6]);
    }

    #[test]
    fn from_values_validates() {
        assert_eq!(
            TargetRoster::from_values(&[1, 2, 3]).map(|r| r.values()),
            Ok(vec![1, 2, 3])
        );
        assert_eq!(
            TargetRoster::from_values(&[1, 7]),
            Err(RollError::InvalidFace(7))
        );
        assert_eq!(TargetRoster::from_values(&[]), Err(RollError::RosterSize(0)));
        assert_eq!(
            TargetRoster::from_values(&[1; 7]),
            Err(RollError::RosterSize(7))
        );
    }

    #[test]
    fn clamped_restore_never_fails() {
        assert_eq!(
            TargetRoster::from_values_clamped(&[0, 9, 4, 1, 1, 1, 1, 1]).values(),
            vec![1, 6, 4, 1, 1, 1]
        );
        assert_eq!(TargetRoster::from_values_clamped(&[]), TargetRoster::default());
    }

    #[test]
    fn edits_respect_bounds_and_leave_state_on_error() {
        let mut roster = TargetRoster::from_values(&[3]).unwrap();

        assert_eq!(roster.remove(0), Err(RollError::RosterSize(0)));
        assert_eq!(
            roster.set(1, 2),
            Err(RollError::NoSuchSlot { index: 1, len: 1 })
        );
        assert_eq!(roster.set(0, 0), Err(RollError::InvalidFace(0)));
        assert_eq!(roster.values(), vec![3]);

        for _ in 1..MAX_DICE {
            roster.push(Face::One).unwrap();
        }
        assert_eq!(roster.push(Face::One), Err(RollError::RosterSize(MAX_DICE + 1)));
        assert_eq!(roster.len(), MAX_DICE);

        assert_eq!(roster.remove(0), Ok(Face::Three));
        roster.set(0, 5).unwrap();
        assert_eq!(roster.values(), vec![5, 1, 1, 1, 1]);
    }
}
