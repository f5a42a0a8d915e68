fn main() {
    // Release builds serve templates embedded in the binary
    minijinja_embed::embed_templates!("templates");
}
