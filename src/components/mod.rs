pub mod slippy_map;
