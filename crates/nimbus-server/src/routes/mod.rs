pub mod dry_run;
pub mod health;
pub mod reconcile;
