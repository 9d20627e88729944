// Adapters layer: implementations for external collaborators (shareable scenario links).

pub mod scenario_link;
