mod ops;
mod property;
mod save_load;
