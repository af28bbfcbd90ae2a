// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no token) → Protected (bearer token) → Elevated (administrator token)
//
// Every tier under /api/v1. Protected and elevated routes share the bearer
// middleware; the administrator check runs inside the user service so the
// same rule holds for any caller.
pub mod elevated;  // Tier 3: administrator account required
pub mod health;    // Liveness probes, outside the tiers
pub mod protected; // Tier 2: bearer token required
pub mod public;    // Tier 1: no authentication
