mod python;
mod native;
