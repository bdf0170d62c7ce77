fn main() -> anyhow::Result<()> {
  artistdb_lib::run()
}
