fn main() {
    munge_report::cli::run();
}
