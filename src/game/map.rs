//! Tactical map module
//!
//! Board state owned by a session. The rest of the core treats the board
//! as opaque: it needs construction, wholesale replacement, a registry of
//! objects placed on the board, and a way to release those objects when
//! the session terminates. Terrain, pathing, and map generation belong to
//! the game-rules crate.

use std::collections::HashMap;
use std::fmt;

use crate::game::id::ObjectId;
use crate::game::object::GameObject;

/// The board of one session: dimensions plus the objects placed on it
pub struct TacticalMap {
    width: u32,
    height: u32,
    objects: HashMap<ObjectId, GameObject>,
}

impl TacticalMap {
    /// Create an empty map with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            objects: HashMap::new(),
        }
    }

    /// Map width in tiles
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in tiles
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a tile coordinate lies on the board
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Place an object on the board, keyed by its id.
    ///
    /// Placing an object with an id already on the board replaces the
    /// previous object. Returns the id for convenience.
    pub fn place(&mut self, object: GameObject) -> ObjectId {
        let id = object.id();
        self.objects.insert(id, object);
        id
    }

    /// Look up a placed object by id
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Look up a placed object mutably
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Iterate over all placed objects
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Number of objects on the board
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Drop every placed object. Called when the owning session
    /// terminates.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl fmt::Debug for TacticalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TacticalMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("objects", &self.objects.len())
            .finish()
    }
}
