use rand::Rng;

/// Particles in a fresh field.
pub const PARTICLE_COUNT: usize = 100;

/// Pairs closer than this are linked; the pointer repels within this radius.
pub const LINK_DISTANCE: f64 = 100.0;

const MAX_LINK_STRENGTH: f64 = 0.1;
const POINTER_PUSH: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Radius, 1 to 3.
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    /// 0.2 to 0.7.
    pub opacity: f64,
}

impl Particle {
    fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        Self {
            x: rng.gen_range(0.0..width.max(f64::EPSILON)),
            y: rng.gen_range(0.0..height.max(f64::EPSILON)),
            size: rng.gen_range(1.0..3.0),
            vx: rng.gen_range(-0.25..0.25),
            vy: rng.gen_range(-0.25..0.25),
            opacity: rng.gen_range(0.2..0.7),
        }
    }
}

/// A line drawn between two nearby particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    /// `0.1 * (1 - d / 100)`.
    pub strength: f64,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f64,
    height: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Scatter [`PARTICLE_COUNT`] particles over a `width` x `height` canvas.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::random(rng, width, height))
            .collect();
        Self::from_particles(width, height, particles)
    }

    pub fn from_particles(width: f64, height: f64, particles: Vec<Particle>) -> Self {
        Self {
            width,
            height,
            particles,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Canvas resized; particles keep their coordinates and wrap on the next
    /// step if they fell outside.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Advance one frame. A particle leaving one edge re-enters at the
    /// opposite edge.
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;

            if p.x > self.width {
                p.x = 0.0;
            }
            if p.x < 0.0 {
                p.x = self.width;
            }
            if p.y > self.height {
                p.y = 0.0;
            }
            if p.y < 0.0 {
                p.y = self.height;
            }
        }
    }

    /// Every pair closer than [`LINK_DISTANCE`].
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for (a, pa) in self.particles.iter().enumerate() {
            for (offset, pb) in self.particles[a + 1..].iter().enumerate() {
                let distance = (pa.x - pb.x).hypot(pa.y - pb.y);
                if distance < LINK_DISTANCE {
                    links.push(Link {
                        a,
                        b: a + 1 + offset,
                        strength: MAX_LINK_STRENGTH * (1.0 - distance / LINK_DISTANCE),
                    });
                }
            }
        }
        links
    }

    /// Push particles near the pointer away from it by 2 % of the offset.
    pub fn repel(&mut self, pointer_x: f64, pointer_y: f64) {
        for p in &mut self.particles {
            let dx = pointer_x - p.x;
            let dy = pointer_y - p.y;
            if dx.hypot(dy) < LINK_DISTANCE {
                p.x -= dx * POINTER_PUSH;
                p.y -= dy * POINTER_PUSH;
            }
        }
    }
}
