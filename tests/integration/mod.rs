mod helpers;
mod test_guards;
mod test_image;
mod test_release;
mod test_tasks;
