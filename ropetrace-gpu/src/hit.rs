use crate::INVALID_ID;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub face_id: u32,
}

impl Hit {
    pub fn none() -> Self {
        Self {
            distance: f32::MAX,
            face_id: INVALID_ID,
        }
    }

    pub fn is_some(self) -> bool {
        self.face_id != INVALID_ID
    }

    pub fn is_none(self) -> bool {
        !self.is_some()
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self::none()
    }
}
