#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Life {
    Alive,
    Dead,
}

impl Life {
    fn from_health(health: u32) -> Self {
        if health == 0 {
            Self::Dead
        } else {
            Self::Alive
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
    pub life: Life,
    pub invulnerable_for: f32,
}

impl PlayerState {
    /// A player spawned with no health starts dead.
    pub fn new(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            score: 0,
            life: Life::from_health(max_health),
            invulnerable_for: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    /// Returns true when this hit killed the player.
    pub fn take_damage(&mut self, amount: u32, invulnerability: f32) -> bool {
        if !self.is_alive() || self.is_invulnerable() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.invulnerable_for = invulnerability.max(0.0);
        if self.health == 0 {
            self.life = Life::Dead;
            return true;
        }
        false
    }

    pub fn tick(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
    }

    pub fn add_score(&mut self, value: u32) {
        self.score = self.score.saturating_add(value);
    }

    pub(crate) fn revive(&mut self) {
        self.health = self.max_health;
        self.life = Life::from_health(self.health);
        self.invulnerable_for = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyState {
    pub health: u32,
    pub life: Life,
}

impl EnemyState {
    pub fn new(health: u32) -> Self {
        Self {
            health,
            life: Life::from_health(health),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == Life::Alive
    }

    /// Dead is terminal; returns true only on the killing hit.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.life = Life::Dead;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorState {
    locked: bool,
    open: bool,
    entered: u32,
}

impl DoorState {
    pub fn new(locked: bool) -> Self {
        Self {
            locked,
            open: false,
            entered: 0,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn times_entered(&self) -> u32 {
        self.entered
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// No-op while locked.
    pub fn open(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.open = true;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn enter(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.entered = self.entered.saturating_add(1);
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum SpringState {
    #[default]
    Ready,
    Cooling { remaining: f32 },
}

impl SpringState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Starts the cooldown. Ignored while already cooling.
    pub fn activate(&mut self, cooldown: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        *self = if cooldown > 0.0 {
            Self::Cooling {
                remaining: cooldown,
            }
        } else {
            Self::Ready
        };
        true
    }

    /// Returns true on the tick the spring becomes ready again.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Self::Cooling { remaining } = *self else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            *self = Self::Ready;
            true
        } else {
            *self = Self::Cooling { remaining };
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinState {
    Available { value: u32 },
    Collected { value: u32 },
}

impl CoinState {
    pub fn new(value: u32) -> Self {
        Self::Available { value }
    }

    pub fn is_collected(&self) -> bool {
        matches!(self, Self::Collected { .. })
    }

    pub fn value(&self) -> u32 {
        match *self {
            Self::Available { value } | Self::Collected { value } => value,
        }
    }

    /// Idempotent: only the first call yields the coin's value.
    pub fn collect(&mut self) -> Option<u32> {
        match *self {
            Self::Available { value } => {
                *self = Self::Collected { value };
                Some(value)
            }
            Self::Collected { .. } => None,
        }
    }
}
