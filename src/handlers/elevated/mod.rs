// handlers/elevated/mod.rs - Elevated handlers (administrator required)
//
// Same bearer middleware as the protected tier. The account must also be
// a superuser, otherwise 403 "The user doesn't have enough privileges".

pub mod users; // GET/POST /api/v1/users, PATCH/DELETE /api/v1/users/:id
