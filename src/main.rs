mod app;

fn main() {
    app::startup::startup();
}
