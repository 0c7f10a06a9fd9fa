//! Snowfall particle field drawn behind the terminal text

use rand::{rngs::StdRng, Rng, SeedableRng};

const GLYPHS: [char; 4] = ['*', '·', '❄', '•'];

/// Screen cells per flake
const CELLS_PER_FLAKE: usize = 50;

#[derive(Debug, Clone, PartialEq)]
struct Flake {
    x: f32,
    y: f32,
    /// Rows per second
    speed: f32,
    /// Columns per second, sign gives the direction
    drift: f32,
    glyph: char,
}

#[derive(Debug)]
pub struct Snowfall {
    rng: StdRng,
    flakes: Vec<Flake>,
    width: u16,
    height: u16,
}

impl Snowfall {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_rng(StdRng::from_entropy(), width, height)
    }

    /// Deterministic field for a given seed
    pub fn with_seed(seed: u64, width: u16, height: u16) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), width, height)
    }

    fn with_rng(rng: StdRng, width: u16, height: u16) -> Self {
        let mut field = Self {
            rng,
            flakes: Vec::new(),
            width: width.max(1),
            height: height.max(1),
        };
        field.populate();
        field
    }

    fn populate(&mut self) {
        let cells = self.width as usize * self.height as usize;
        let target = (cells + CELLS_PER_FLAKE - 1) / CELLS_PER_FLAKE;
        self.flakes.truncate(target);
        while self.flakes.len() < target {
            let y = self.rng.gen_range(0.0..self.height as f32);
            let flake = self.spawn(y);
            self.flakes.push(flake);
        }
    }

    fn spawn(&mut self, y: f32) -> Flake {
        Flake {
            x: self.rng.gen_range(0.0..self.width as f32),
            y,
            speed: self.rng.gen_range(1.5..5.0),
            drift: self.rng.gen_range(-0.8..0.8),
            glyph: GLYPHS[self.rng.gen_range(0..GLYPHS.len())],
        }
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    /// Adapt to a new screen size, keeping the density constant
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width.max(1);
        self.height = height.max(1);
        let (w, h) = (self.width as f32, self.height as f32);
        for flake in &mut self.flakes {
            flake.x = flake.x.rem_euclid(w);
            flake.y = flake.y.min(h - 1.0);
        }
        self.populate();
    }

    /// Advance the field by `dt` seconds. Flakes leaving the bottom re-enter
    /// at the top.
    pub fn step(&mut self, dt: f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        for i in 0..self.flakes.len() {
            let flake = &mut self.flakes[i];
            flake.y += flake.speed * dt;
            flake.x = (flake.x + flake.drift * dt).rem_euclid(w);
            if flake.y >= h {
                let fresh = self.spawn(0.0);
                self.flakes[i] = fresh;
            }
        }
    }

    /// Cells occupied by flakes as `(column, row, glyph)`
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        self.flakes.iter().filter_map(move |f| {
            let (x, y) = (f.x as u16, f.y as u16);
            (x < self.width && y < self.height).then_some((x, y, f.glyph))
        })
    }
}
