//! # Register Commands
//!
//! Every operation a front end can invoke on the register.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Sale Draft manipulation
//! ├── discount.rs  ◄─── Item/global discounts, cascade preview
//! ├── cash.rs      ◄─── Drawer session: open, movements, close, history
//! ├── sale.rs      ◄─── Sale completion
//! └── config.rs    ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Front end (cli.rs)                                                     │
//! │  ──────────────────                                                     │
//! │  "discount SKU-1 10+5"                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  fn set_item_discount(                                                  │
//! │      cart: &CartState,          ◄── only the state it needs             │
//! │      product_id: &str,                                                  │
//! │      discount: Option<DiscountInput>,                                   │
//! │  ) -> Result<CartResponse, ApiError>                                    │
//! │         │                                                               │
//! │         │ (serde, camelCase)                                            │
//! │         ▼                                                               │
//! │  {"ok":true,"data":{...}}  or  {"ok":false,"error":{"code":...}}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod cash;
pub mod config;
pub mod discount;
pub mod sale;
