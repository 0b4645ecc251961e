fn main() {
    // Propagates the ESP-IDF build environment when cross-compiling for the
    // board; emits nothing on plain host builds.
    embuild::espidf::sysenv::output();
}
