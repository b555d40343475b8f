



#[cfg(test)]
mod mediation_office_tests;

#[cfg(test)]
mod document_send_tests;

#[cfg(test)]
mod signature_tests;
