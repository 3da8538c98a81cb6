mod collision;
mod effects;
mod entity;
mod history;
mod lifecycle;
mod registry;
mod response;
mod session;

pub use collision::{side_of, Aabb, Side};
pub use effects::{EffectAction, EffectQueue, ScheduledEffect};
pub use entity::{Contact, Entity, EntityId, EntitySpawn, KindState, Patrol, Visual, DEAD_ALPHA};
pub use history::{CollisionEvent, CollisionHistory};
pub use lifecycle::{CoinState, DoorState, EnemyState, Life, PlayerState, SpringState};
pub use registry::{CollisionPair, EntityIdAllocator, EntityRegistry};
pub use response::{
    classify, CollisionCategory, CollisionDispatcher, NoopHooks, Resolution, ResponseHooks,
};
pub use session::{load_entities, PlaySession};
