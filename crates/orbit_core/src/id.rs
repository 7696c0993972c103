use rand::Rng;
use uuid::Uuid;

/// Build a v4-format UUID from the injected RNG so id generation stays
/// reproducible under a fixed seed.
pub fn seeded_uuid(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen::<[u8; 16]>()).into_uuid()
}
