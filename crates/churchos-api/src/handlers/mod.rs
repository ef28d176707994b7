//! Route handlers.
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | `GET` | `/health` | public |
//! | `GET` | `/api` | public |
//! | `GET` | `/api/auth/me` | any authenticated caller |
//! | `GET` | `/api/auth/permissions` | any authenticated caller |
//! | `GET` | `/api/users` | Apostle and above |
//! | `GET` | `/api/users/{id}` | Apostle and above |
//! | `PUT` | `/api/users/{id}/role` | Apostle and above, strictly downward grants |
//! | `GET` | `/api/seal-status` | Nation Seer |

pub mod auth;
pub mod health;
pub mod seal;
pub mod users;
