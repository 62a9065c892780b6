use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dispatch_core::{
    Capability, CapabilityFault, CapabilityInput, CapabilityKind, CapabilityTable,
    DispatchConfig, Dispatcher,
};

/// Answers every call with the same text and records what it was asked.
pub struct FixedCapability {
    kind: CapabilityKind,
    reply: String,
    calls: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<CapabilityInput>>>,
}

#[async_trait]
impl Capability for FixedCapability {
    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(input);
        Ok(self.reply.clone())
    }
}

/// Handles on the document capability of a test dispatcher.
pub struct DocumentProbe {
    pub calls: Arc<AtomicUsize>,
    pub inputs: Arc<Mutex<Vec<CapabilityInput>>>,
}

/// A dispatcher where every capability answers `reply`; returns the call
/// counter of the document capability.
pub fn document_dispatcher(reply: &str) -> (Dispatcher, Arc<AtomicUsize>) {
    let (dispatcher, document) = dispatcher_with_config(DispatchConfig::default(), reply);
    (dispatcher, document.calls)
}

pub fn dispatcher_with_config(config: DispatchConfig, reply: &str) -> (Dispatcher, DocumentProbe) {
    let document = DocumentProbe {
        calls: Arc::new(AtomicUsize::new(0)),
        inputs: Arc::new(Mutex::new(Vec::new())),
    };
    let mut builder = CapabilityTable::builder();
    for kind in CapabilityKind::ALL {
        let (calls, inputs) = if kind == CapabilityKind::ExtractAndSummarizeDocument {
            (document.calls.clone(), document.inputs.clone())
        } else {
            (Arc::new(AtomicUsize::new(0)), Arc::new(Mutex::new(Vec::new())))
        };
        builder = builder
            .register(FixedCapability {
                kind,
                reply: reply.to_string(),
                calls,
                inputs,
            })
            .expect("kinds are distinct");
    }
    let table = builder
        .build(&config.required_capabilities())
        .expect("all kinds registered");
    let dispatcher = Dispatcher::new(config, table).expect("table satisfies config");
    (dispatcher, document)
}
