//! Gem module - a single tile and its animation state machine
//!
//! A gem keeps two positions: the logical grid slot `(row, col)` used by the match
//! and gravity algorithms, and a visual pixel position that a presentation layer
//! interpolates one tick at a time. The board only ever reasons about the logical
//! slot; the visual position just chases it.
//!
//! States: `Idle -> Swapping -> Idle`, `Idle -> Falling -> Idle`, and
//! `Idle/Swapping/Falling -> Clearing` (terminal).

use crate::types::{Attribute, EffectStatus, GemState, FALL_STEP, SWAP_STEP, TILE_SIZE};

/// Visual position in pixels (top-left corner of the gem)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position of a grid slot
    pub fn of_slot(row: i32, col: i32) -> Self {
        Self {
            x: col as f32 * TILE_SIZE,
            y: row as f32 * TILE_SIZE,
        }
    }
}

/// Move `current` one step towards `target`, snapping when within one step
fn step_towards(current: f32, target: f32, step: f32) -> f32 {
    if (current - target).abs() > step {
        if current < target {
            current + step
        } else {
            current - step
        }
    } else {
        target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gem {
    attribute: Attribute,
    effect: EffectStatus,
    row: u8,
    col: u8,
    state: GemState,
    marked_for_clearing: bool,
    /// Rows still to be added to `row` when a `start_falling` animation lands
    fall_distance: u8,
    current: PixelPos,
    target: PixelPos,
}

impl Gem {
    /// Create an idle gem sitting exactly on its slot
    pub fn new(attribute: Attribute, row: u8, col: u8) -> Self {
        let pos = PixelPos::of_slot(i32::from(row), i32::from(col));
        Self {
            attribute,
            effect: EffectStatus::Normal,
            row,
            col,
            state: GemState::Idle,
            marked_for_clearing: false,
            fall_distance: 0,
            current: pos,
            target: pos,
        }
    }

    /// Create a refill gem: logically in its slot, visually `rows_above` rows higher,
    /// falling into place.
    pub fn spawn_above(attribute: Attribute, row: u8, col: u8, rows_above: u8) -> Self {
        let mut gem = Self::new(attribute, row, col);
        if rows_above > 0 {
            gem.current = PixelPos::of_slot(
                i32::from(row) - i32::from(rows_above),
                i32::from(col),
            );
            gem.state = GemState::Falling;
        }
        gem
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn effect_status(&self) -> EffectStatus {
        self.effect
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    pub fn state(&self) -> GemState {
        self.state
    }

    pub fn is_marked_for_clearing(&self) -> bool {
        self.marked_for_clearing
    }

    pub fn position(&self) -> PixelPos {
        self.current
    }

    pub fn target_position(&self) -> PixelPos {
        self.target
    }

    pub fn is_idle(&self) -> bool {
        self.state == GemState::Idle
    }

    /// A gem in `Clearing` is finished and may be removed from the board
    pub fn has_finished_clearing(&self) -> bool {
        self.state == GemState::Clearing
    }

    /// Exchange logical slots with `other` and animate both towards their new slots.
    ///
    /// Returns false (and changes nothing) when either gem is already clearing.
    pub fn swap_with(&mut self, other: &mut Gem) -> bool {
        if self.marked_for_clearing || other.marked_for_clearing {
            return false;
        }

        std::mem::swap(&mut self.row, &mut other.row);
        std::mem::swap(&mut self.col, &mut other.col);

        for gem in [&mut *self, &mut *other] {
            gem.target = PixelPos::of_slot(i32::from(gem.row), i32::from(gem.col));
            gem.state = GemState::Swapping;
        }
        true
    }

    /// Begin falling `num_rows` rows. The logical row advances when the gem lands.
    pub fn start_falling(&mut self, num_rows: u8) {
        if num_rows == 0 || self.marked_for_clearing {
            return;
        }
        self.fall_distance = num_rows;
        self.target = PixelPos::of_slot(
            i32::from(self.row) + i32::from(num_rows),
            i32::from(self.col),
        );
        self.state = GemState::Falling;
    }

    /// Move the gem to a new logical row right away and animate the drop.
    ///
    /// Gravity uses this so the grid slot and the gem's coordinates never disagree.
    pub(crate) fn drop_to(&mut self, row: u8) {
        if row == self.row {
            return;
        }
        self.row = row;
        self.fall_distance = 0;
        self.target = PixelPos::of_slot(i32::from(row), i32::from(self.col));
        if !self.marked_for_clearing {
            self.state = GemState::Falling;
        }
    }

    /// Flag for removal. One-way: a clearing gem never comes back.
    pub fn mark_for_clearing(&mut self) {
        self.marked_for_clearing = true;
        self.state = GemState::Clearing;
    }

    /// Advance a swap animation by one tick
    pub fn update_swap_animation(&mut self) {
        if self.state != GemState::Swapping {
            return;
        }

        self.current.x = step_towards(self.current.x, self.target.x, SWAP_STEP);
        self.current.y = step_towards(self.current.y, self.target.y, SWAP_STEP);

        if self.current == self.target {
            self.state = GemState::Idle;
        }
    }

    /// Advance a fall animation by one tick
    pub fn update_fall_animation(&mut self) {
        if self.state != GemState::Falling {
            return;
        }

        if self.current.y < self.target.y {
            self.current.y = (self.current.y + FALL_STEP).min(self.target.y);
        }
        // A gem that was mid-swap when gravity moved it still has to line up.
        self.current.x = step_towards(self.current.x, self.target.x, SWAP_STEP);

        if self.current.y >= self.target.y && self.current.x == self.target.x {
            self.row = self.row.saturating_add(self.fall_distance);
            self.fall_distance = 0;
            self.current.y = self.row as f32 * TILE_SIZE;
            self.target.y = self.current.y;
            self.state = GemState::Idle;
        }
    }

    /// Advance whatever animation is running. Returns true while still moving.
    pub fn update_animation(&mut self) -> bool {
        match self.state {
            GemState::Swapping => self.update_swap_animation(),
            GemState::Falling => self.update_fall_animation(),
            GemState::Idle | GemState::Clearing => {}
        }
        self.state.is_moving()
    }
}
