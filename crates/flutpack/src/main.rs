fn main() -> anyhow::Result<()> {
    flutpack::run()
}
