mod engine;
mod geometry;
mod tools;

fn main() {
    engine::core::app_setup::create_app().run();
}
