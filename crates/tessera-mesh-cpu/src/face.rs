use crate::chunk::FaceGroup;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::PosY, Face::NegY, Face::PosX, Face::NegX, Face::PosZ, Face::NegZ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn normal(self) -> [f32; 3] {
        let (x, y, z) = self.delta();
        [x as f32, y as f32, z as f32]
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    /// In-plane axes `(u, v)` used to place corners and AO probes.
    #[inline]
    pub fn tangents(self) -> ((i32, i32, i32), (i32, i32, i32)) {
        match self {
            Face::PosY | Face::NegY => ((1, 0, 0), (0, 0, 1)),
            Face::PosX | Face::NegX => ((0, 0, 1), (0, 1, 0)),
            Face::PosZ | Face::NegZ => ((1, 0, 0), (0, 1, 0)),
        }
    }

    #[inline]
    pub fn group(self) -> FaceGroup {
        match self {
            Face::PosY => FaceGroup::Top,
            Face::NegY => FaceGroup::Bottom,
            _ => FaceGroup::Side,
        }
    }

    /// Directional exposure: top 1.0, bottom 0.5, east/west 0.6, north/south 0.8.
    #[inline]
    pub fn shade(self) -> f32 {
        match self {
            Face::PosY => 1.0,
            Face::NegY => 0.5,
            Face::PosX | Face::NegX => 0.6,
            Face::PosZ | Face::NegZ => 0.8,
        }
    }
}
