//! Account balances: funds additions, balance resets and the routes for
//! getting, topping up and clearing a user's balance.

mod clear_endpoint;
mod core;
mod funds_endpoint;
mod get_endpoint;

pub use clear_endpoint::clear_balance_endpoint;
pub use core::{
    Account, Balance, add_funds, create_balance_reset_table, create_funds_table, get_balance,
};
pub use funds_endpoint::add_funds_endpoint;
pub use get_endpoint::get_balance_endpoint;
