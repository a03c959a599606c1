mod concat;
mod save_load;
