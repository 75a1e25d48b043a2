//! Level structure
//!
//! The grid plus the authoritative monster and floor item tables. Cells only
//! hold back-references into those tables, and every mutation goes through
//! [`Level`] so the two never disagree.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::cell::{Cell, Feature, Occupant};
use crate::geometry::{Coord, in_bounds, on_grid};
use crate::item::{FloorItem, ItemId};
use crate::monster::{Monster, MonsterId};

/// One dungeon level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredLevel")]
pub struct Level {
    pub depth: i32,
    pub height: i32,
    pub width: i32,
    /// Map cells, indexed `[y][x]`
    pub cells: Vec<Vec<Cell>>,
    /// Live monsters in table order
    pub monsters: Vec<Monster>,
    /// Monster id to table index
    #[serde(skip)]
    lookup: HashMap<MonsterId, usize>,
    /// Monsters killed or eaten this sweep, removed by [`Level::compact`]
    #[serde(skip)]
    pending: HashSet<MonsterId>,
    pub items: HashMap<ItemId, FloorItem>,
    /// Breeders created on this level
    pub multiplied: i32,
    next_monster_id: u32,
    next_item_id: u32,
}

/// Serialized form of [`Level`]; the id lookup is derived on load
#[derive(Deserialize)]
struct StoredLevel {
    depth: i32,
    height: i32,
    width: i32,
    cells: Vec<Vec<Cell>>,
    monsters: Vec<Monster>,
    items: HashMap<ItemId, FloorItem>,
    multiplied: i32,
    next_monster_id: u32,
    next_item_id: u32,
}

impl From<StoredLevel> for Level {
    fn from(stored: StoredLevel) -> Self {
        let mut level = Self {
            depth: stored.depth,
            height: stored.height,
            width: stored.width,
            cells: stored.cells,
            monsters: stored.monsters,
            lookup: HashMap::new(),
            pending: HashSet::new(),
            items: stored.items,
            multiplied: stored.multiplied,
            next_monster_id: stored.next_monster_id,
            next_item_id: stored.next_item_id,
        };
        level.rebuild_lookup();
        level
    }
}

impl Level {
    /// A level with every cell undefined
    pub fn new(depth: i32, height: i32, width: i32) -> Self {
        assert!(height > 2 && width > 2, "level of {height}x{width} has no interior");
        Self {
            depth,
            height,
            width,
            cells: vec![vec![Cell::default(); width as usize]; height as usize],
            monsters: Vec::new(),
            lookup: HashMap::new(),
            pending: HashSet::new(),
            items: HashMap::new(),
            multiplied: 0,
            next_monster_id: 1,
            next_item_id: 1,
        }
    }

    pub fn cell(&self, c: Coord) -> &Cell {
        &self.cells[c.y as usize][c.x as usize]
    }

    pub fn cell_mut(&mut self, c: Coord) -> &mut Cell {
        &mut self.cells[c.y as usize][c.x as usize]
    }

    pub fn feature(&self, c: Coord) -> Feature {
        self.cell(c).feature
    }

    pub fn set_feature(&mut self, c: Coord, feature: Feature) {
        self.cell_mut(c).feature = feature;
    }

    /// Strictly inside the boundary ring
    pub const fn in_bounds(&self, c: Coord) -> bool {
        in_bounds(c, self.height, self.width)
    }

    pub const fn on_grid(&self, c: Coord) -> bool {
        on_grid(c, self.height, self.width)
    }

    /// Every coordinate of the grid in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + use<> {
        let (height, width) = (self.height, self.width);
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(y, x)))
    }

    /// Number of orthogonal neighbours that are cave walls
    pub fn next_to_walls(&self, c: Coord) -> usize {
        c.orthogonal()
            .into_iter()
            .filter(|&n| self.on_grid(n) && self.feature(n).is_wall())
            .count()
    }

    /// Number of orthogonal neighbours that are corridor
    pub fn next_to_corridors(&self, c: Coord) -> usize {
        c.orthogonal()
            .into_iter()
            .filter(|&n| self.on_grid(n) && self.feature(n) == Feature::Corridor)
            .count()
    }

    /// Whether sight passes through `c`
    pub fn transparent(&self, c: Coord) -> bool {
        self.on_grid(c) && !self.feature(c).blocks_sight()
    }

    /// Line of sight between two cells
    pub fn los(&self, from: Coord, to: Coord) -> bool {
        crate::geometry::los(from, to, |c| !self.transparent(c))
    }

    // Monsters

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.lookup.get(&id).map(|&i| &self.monsters[i])
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.lookup.get(&id).map(|&i| &mut self.monsters[i])
    }

    pub fn monster_at(&self, c: Coord) -> Option<MonsterId> {
        self.cell(c).occupant.monster()
    }

    /// Table index of a monster
    pub fn index_of(&self, id: MonsterId) -> Option<usize> {
        self.lookup.get(&id).copied()
    }

    /// Add a monster, claiming its cell
    pub fn add_monster(&mut self, mut monster: Monster) -> MonsterId {
        let pos = monster.pos;
        assert!(
            self.cell(pos).occupant == Occupant::Empty,
            "monster placed on occupied cell {pos:?}"
        );
        let id = MonsterId(self.next_monster_id);
        self.next_monster_id += 1;
        monster.id = id;
        self.cell_mut(pos).occupant = Occupant::Monster(id);
        self.lookup.insert(id, self.monsters.len());
        self.monsters.push(monster);
        id
    }

    /// Take a monster off the map and schedule its table slot for compaction
    ///
    /// The entry stays in the table until [`Level::compact`], so table indices
    /// held by an in-progress sweep remain valid.
    pub fn remove_monster(&mut self, id: MonsterId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        if !self.pending.insert(id) {
            return;
        }
        let pos = self.monsters[index].pos;
        if self.cell(pos).occupant == Occupant::Monster(id) {
            self.cell_mut(pos).occupant = Occupant::Empty;
        }
    }

    pub fn is_pending_removal(&self, id: MonsterId) -> bool {
        self.pending.contains(&id)
    }

    /// Drop every monster scheduled for removal and rebuild the id lookup
    pub fn compact(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = core::mem::take(&mut self.pending);
        self.monsters.retain(|m| !pending.contains(&m.id));
        self.rebuild_lookup();
    }

    fn rebuild_lookup(&mut self) {
        self.lookup = self
            .monsters
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id, i))
            .collect();
    }

    /// Monsters still on the map
    pub fn live_monsters(&self) -> usize {
        self.monsters.len() - self.pending.len()
    }

    /// Move a monster to an empty cell
    pub fn move_monster(&mut self, id: MonsterId, to: Coord) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let from = self.monsters[index].pos;
        debug_assert!(self.cell(to).occupant == Occupant::Empty);
        if self.cell(from).occupant == Occupant::Monster(id) {
            self.cell_mut(from).occupant = Occupant::Empty;
        }
        self.cell_mut(to).occupant = Occupant::Monster(id);
        self.monsters[index].pos = to;
    }

    /// Monsters in the 3x3 block around `c`
    pub fn monsters_around(&self, c: Coord) -> i32 {
        (c.y - 1..=c.y + 1)
            .flat_map(|y| (c.x - 1..=c.x + 1).map(move |x| Coord::new(y, x)))
            .filter(|&n| self.on_grid(n) && self.monster_at(n).is_some())
            .count() as i32
    }

    // Items

    /// Drop an item on an empty cell
    pub fn place_item(&mut self, c: Coord, item: FloorItem) -> Option<ItemId> {
        if self.cell(c).item.is_some() {
            return None;
        }
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        self.items.insert(id, item);
        self.cell_mut(c).item = Some(id);
        Some(id)
    }

    pub fn item_at(&self, c: Coord) -> Option<&FloorItem> {
        self.cell(c).item.and_then(|id| self.items.get(&id))
    }

    /// Remove and return the item on a cell
    pub fn take_item(&mut self, c: Coord) -> Option<FloorItem> {
        let id = self.cell_mut(c).item.take()?;
        self.items.remove(&id)
    }

    // Player

    /// Move the player marker; the caller keeps the player's own position
    pub fn move_player(&mut self, from: Option<Coord>, to: Coord) {
        if let Some(from) = from
            && self.on_grid(from)
            && self.cell(from).occupant == Occupant::Player
        {
            self.cell_mut(from).occupant = Occupant::Empty;
        }
        self.cell_mut(to).occupant = Occupant::Player;
    }

    /// Cells of a given feature
    pub fn find_features(&self, feature: Feature) -> Vec<Coord> {
        self.coords().filter(|&c| self.feature(c) == feature).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        let mut level = Level::new(1, 10, 10);
        for y in 1..9 {
            for x in 1..9 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
            }
        }
        level
    }

    #[test]
    fn test_add_and_lookup() {
        let mut level = level();
        let id = level.add_monster(Monster::new(0, Coord::new(2, 2), 5));
        assert_eq!(level.monster_at(Coord::new(2, 2)), Some(id));
        assert_eq!(level.monster(id).map(|m| m.pos), Some(Coord::new(2, 2)));
    }

    #[test]
    fn test_lookup_survives_serde() {
        let mut level = level();
        let a = level.add_monster(Monster::new(0, Coord::new(2, 2), 5));
        let b = level.add_monster(Monster::new(0, Coord::new(3, 3), 5));
        let json = serde_json::to_string(&level).unwrap();
        let back: Level = serde_json::from_str(&json).unwrap();
        assert_eq!(back.monster(a).map(|m| m.pos), Some(Coord::new(2, 2)));
        assert_eq!(back.index_of(b), Some(1));
        assert_eq!(back.monster_at(Coord::new(3, 3)), Some(b));
        assert_eq!(back.live_monsters(), 2);
    }

    #[test]
    fn test_removal_is_deferred() {
        let mut level = level();
        let a = level.add_monster(Monster::new(0, Coord::new(2, 2), 5));
        let b = level.add_monster(Monster::new(0, Coord::new(3, 3), 5));
        level.remove_monster(a);
        assert_eq!(level.monsters.len(), 2);
        assert_eq!(level.live_monsters(), 1);
        assert_eq!(level.monster_at(Coord::new(2, 2)), None);
        assert_eq!(level.index_of(b), Some(1));
        level.compact();
        assert_eq!(level.monsters.len(), 1);
        assert_eq!(level.index_of(b), Some(0));
        assert!(level.monster(a).is_none());
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut level = level();
        let a = level.add_monster(Monster::new(0, Coord::new(2, 2), 5));
        level.remove_monster(a);
        level.remove_monster(a);
        assert_eq!(level.live_monsters(), 0);
    }

    #[test]
    fn test_move_monster_updates_cells() {
        let mut level = level();
        let a = level.add_monster(Monster::new(0, Coord::new(2, 2), 5));
        level.move_monster(a, Coord::new(2, 3));
        assert_eq!(level.monster_at(Coord::new(2, 2)), None);
        assert_eq!(level.monster_at(Coord::new(2, 3)), Some(a));
    }

    #[test]
    fn test_items_one_per_cell() {
        let mut level = level();
        let c = Coord::new(4, 4);
        assert!(level.place_item(c, FloorItem::gold(10)).is_some());
        assert!(level.place_item(c, FloorItem::gold(20)).is_none());
        assert_eq!(level.take_item(c).map(|i| i.value), Some(10));
        assert!(level.item_at(c).is_none());
        assert!(level.items.is_empty());
    }

    #[test]
    fn test_next_to_walls() {
        let mut level = level();
        let c = Coord::new(1, 1);
        level.set_feature(Coord::new(0, 1), Feature::Granite);
        level.set_feature(Coord::new(1, 0), Feature::Granite);
        assert_eq!(level.next_to_walls(c), 2);
    }
}
