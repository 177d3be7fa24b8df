// ext filesystem family
// Only the second extended filesystem is handled; no journal or extent features.

pub mod ext2;
